//! Codec property tests.
//!
//! Every message decodes back to itself, its length is fixed by the opcode,
//! and any shorter buffer is reported as truncated.

use proptest::prelude::*;
use tradebridge::error::ProtocolError;
use tradebridge::protocol::{
    AccountBalance, AccountInfo, AccountType, Action, ActionKind, Asset, BarSnapshot,
    ClosedEvent, CommissionType, MarginCalculationType, OpenRequest, Position, PositionEvent,
    PositionType, RunMode, RuntimeInfo, SwapCalculationType, SymbolInfo, Target, TickAccuracy,
    TickSnapshot, Trade, TradeSide, Update, UpdateKind, VolumeEvent, Weekday,
};

fn price() -> impl Strategy<Value = f64> {
    0.00001f64..100_000.0
}

fn side() -> impl Strategy<Value = TradeSide> {
    prop_oneof![Just(TradeSide::Buy), Just(TradeSide::Sell)]
}

fn target() -> impl Strategy<Value = Target> {
    prop::sample::select(Target::ALL.to_vec())
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Complete),
        (
            side(),
            any::<u8>(),
            price(),
            prop::option::of(price()),
            prop::option::of(price())
        )
            .prop_map(|(side, ty, volume, sl, tp)| Action::Open(
                side,
                OpenRequest {
                    position_type: PositionType(ty),
                    volume,
                    stop_loss_pips: sl,
                    take_profit_pips: tp,
                }
            )),
        (side(), any::<i32>(), price()).prop_map(|(side, position_id, volume)| {
            Action::ModifyVolume {
                side,
                position_id,
                volume,
            }
        }),
        (side(), any::<i32>(), prop::option::of(price())).prop_map(
            |(side, position_id, price)| Action::ModifyStopLoss {
                side,
                position_id,
                price,
            }
        ),
        (side(), any::<i32>(), prop::option::of(price())).prop_map(
            |(side, position_id, price)| Action::ModifyTakeProfit {
                side,
                position_id,
                price,
            }
        ),
        (side(), any::<i32>())
            .prop_map(|(side, position_id)| Action::Close { side, position_id }),
        (target(), prop::option::of(price())).prop_map(|(t, p)| Action::SetTarget(t, p)),
    ]
}

fn tick() -> impl Strategy<Value = TickSnapshot> {
    (any::<i64>(), price(), price()).prop_map(|(time_ms, ask, bid)| TickSnapshot {
        time_ms,
        ask,
        bid,
    })
}

fn position_event() -> impl Strategy<Value = PositionEvent> {
    (
        any::<i64>(),
        price(),
        price(),
        any::<i32>(),
        side(),
        prop::option::of(price()),
        prop::option::of(price()),
    )
        .prop_map(|(time_ms, open, volume, id, side, sl, tp)| PositionEvent {
            bar: BarSnapshot {
                open_time_ms: time_ms,
                open,
                high: open,
                low: open,
                close: open,
                tick_volume: 1.0,
            },
            account: AccountBalance {
                balance: volume,
                equity: volume,
            },
            position: Position {
                id,
                position_type: PositionType(0),
                side,
                entry_time_ms: time_ms,
                entry_price: open,
                volume,
                stop_loss: sl,
                take_profit: tp,
            },
        })
}

fn bar() -> impl Strategy<Value = BarSnapshot> {
    (any::<i64>(), price(), price(), price(), price(), 0.0f64..1_000_000.0).prop_map(
        |(open_time_ms, open, high, low, close, tick_volume)| BarSnapshot {
            open_time_ms,
            open,
            high,
            low,
            close,
            tick_volume,
        },
    )
}

fn runtime() -> impl Strategy<Value = RuntimeInfo> {
    (
        prop::sample::select(vec![
            RunMode::RealTime,
            RunMode::SilentBacktesting,
            RunMode::VisualBacktesting,
            RunMode::Optimization,
        ]),
        prop::sample::select(vec![
            TickAccuracy::Ticks,
            TickAccuracy::M1Bars,
            TickAccuracy::OpenPrices,
        ]),
    )
        .prop_map(|(run_mode, tick_accuracy)| RuntimeInfo {
            run_mode,
            tick_accuracy,
        })
}

fn account() -> impl Strategy<Value = AccountInfo> {
    (
        (price(), price(), price(), price()),
        prop::sample::select(vec![
            AccountType::Hedged,
            AccountType::Netted,
            AccountType::SpreadBetting,
        ]),
        any::<u8>(),
        (price(), price(), prop::option::of(price()), price()),
        prop::sample::select(vec![
            MarginCalculationType::Max,
            MarginCalculationType::Sum,
            MarginCalculationType::Net,
        ]),
    )
        .prop_map(
            |(
                (balance, equity, credit, leverage),
                account_type,
                asset,
                (margin, free_margin, margin_level, stop_out_level),
                margin_calculation,
            )| AccountInfo {
                balance,
                equity,
                account_type,
                asset: Asset(asset),
                credit,
                leverage,
                margin,
                free_margin,
                margin_level,
                stop_out_level,
                margin_calculation,
            },
        )
}

fn symbol() -> impl Strategy<Value = SymbolInfo> {
    (
        (any::<u8>(), any::<u8>(), 0i32..10),
        (price(), price(), price(), price(), price(), price()),
        (price(), price(), price()),
        prop::sample::select(vec![
            CommissionType::UsdPerMillionUsdVolume,
            CommissionType::UsdPerLot,
            CommissionType::PercentageOfVolume,
            CommissionType::QuoteCurrencyPerLot,
        ]),
        prop::sample::select(vec![
            SwapCalculationType::Pips,
            SwapCalculationType::Percentage,
            SwapCalculationType::Points,
        ]),
        prop::option::of(prop::sample::select(vec![
            Weekday::Sunday,
            Weekday::Monday,
            Weekday::Tuesday,
            Weekday::Wednesday,
            Weekday::Thursday,
            Weekday::Friday,
            Weekday::Saturday,
        ])),
    )
        .prop_map(
            |(
                (base, quote, digits),
                (pip_size, tick_size, lot_size, min_volume, max_volume, step_volume),
                (commission, swap_long, swap_short),
                commission_type,
                swap_calculation,
                triple_swap_day,
            )| SymbolInfo {
                base_asset: Asset(base),
                quote_asset: Asset(quote),
                digits,
                pip_size,
                tick_size,
                lot_size,
                min_volume,
                max_volume,
                step_volume,
                commission,
                commission_type,
                swap_long,
                swap_short,
                swap_calculation,
                triple_swap_day,
            },
        )
}

fn trade() -> impl Strategy<Value = Trade> {
    (
        (any::<i32>(), any::<i64>(), any::<u8>(), side()),
        (any::<i64>(), any::<i64>(), price(), price(), price()),
        (price(), price(), price(), price(), price()),
    )
        .prop_map(
            |(
                (position_id, closing_deal_id, ty, side),
                (entry_time_ms, closing_time_ms, entry_price, closing_price, volume),
                (gross_profit, commissions, swap, pips, net_profit),
            )| Trade {
                position_id,
                closing_deal_id,
                position_type: PositionType(ty),
                side,
                entry_time_ms,
                closing_time_ms,
                entry_price,
                closing_price,
                volume,
                gross_profit,
                commissions,
                swap,
                pips,
                net_profit,
            },
        )
}

fn update() -> impl Strategy<Value = Update> {
    prop_oneof![
        Just(Update::Complete),
        Just(Update::Shutdown),
        runtime().prop_map(Update::Runtime),
        account().prop_map(Update::Account),
        symbol().prop_map(Update::Symbol),
        bar().prop_map(Update::BarClosed),
        tick().prop_map(Update::TickClosed),
        (target(), tick()).prop_map(|(t, tick)| Update::TargetReached(t, tick)),
        (side(), position_event()).prop_map(|(s, e)| Update::Opened(s, e)),
        (side(), position_event()).prop_map(|(s, e)| Update::ModifiedStopLoss(s, e)),
        (side(), position_event()).prop_map(|(s, e)| Update::ModifiedTakeProfit(s, e)),
        (side(), position_event(), trade()).prop_map(|(s, e, trade)| Update::ModifiedVolume(
            s,
            VolumeEvent {
                bar: e.bar,
                account: e.account,
                position: e.position,
                trade,
            }
        )),
        (side(), bar(), trade()).prop_map(|(s, bar, trade)| Update::Closed(
            s,
            ClosedEvent {
                bar,
                account: AccountBalance {
                    balance: trade.volume,
                    equity: trade.net_profit,
                },
                trade,
            }
        )),
    ]
}

proptest! {
    #[test]
    fn action_round_trip(action in action()) {
        let bytes = action.encode();
        prop_assert_eq!(bytes.len(), 1 + action.kind().payload_size());
        prop_assert_eq!(Action::decode_message(&bytes).unwrap(), action);
    }

    #[test]
    fn update_round_trip(update in update()) {
        let bytes = update.encode();
        prop_assert_eq!(bytes.len(), update.wire_len());
        prop_assert_eq!(Update::decode_message(&bytes).unwrap(), update);
    }

    #[test]
    fn short_action_is_truncated(action in action(), cut in any::<prop::sample::Index>()) {
        let bytes = action.encode();
        prop_assume!(bytes.len() > 1);
        let len = cut.index(bytes.len());
        let is_truncated = matches!(
            Action::decode_message(&bytes[..len]),
            Err(ProtocolError::Truncated { .. })
        );
        prop_assert!(is_truncated);
    }

    #[test]
    fn short_update_is_truncated(update in update(), cut in any::<prop::sample::Index>()) {
        let bytes = update.encode();
        prop_assume!(bytes.len() > 1);
        let len = cut.index(bytes.len());
        let is_truncated = matches!(
            Update::decode_message(&bytes[..len]),
            Err(ProtocolError::Truncated { .. })
        );
        prop_assert!(is_truncated);
    }

    #[test]
    fn unknown_action_opcode(opcode in 15u8..=255) {
        let is_unknown = matches!(
            Action::decode(opcode, &[]),
            Err(ProtocolError::UnknownOpcode { .. })
        );
        prop_assert!(is_unknown);
    }
}

#[test]
fn minus_one_reads_back_as_absent() {
    let sent = Action::ModifyStopLoss {
        side: TradeSide::Sell,
        position_id: 5,
        price: Some(-1.0),
    };
    let decoded = Action::decode_message(&sent.encode()).expect("decode");
    assert_eq!(
        decoded,
        Action::ModifyStopLoss {
            side: TradeSide::Sell,
            position_id: 5,
            price: None,
        }
    );
}

#[test]
fn absent_margin_level_survives() {
    let account = AccountInfo {
        balance: 500.0,
        equity: 480.0,
        account_type: AccountType::Netted,
        asset: Asset(2),
        credit: 0.0,
        leverage: 30.0,
        margin: 0.0,
        free_margin: 480.0,
        margin_level: None,
        stop_out_level: 50.0,
        margin_calculation: MarginCalculationType::Net,
    };
    let sent = Update::Account(account);
    assert_eq!(Update::decode_message(&sent.encode()).expect("decode"), sent);

    let sent = Update::Account(AccountInfo {
        margin_level: Some(1250.0),
        ..account
    });
    assert_eq!(Update::decode_message(&sent.encode()).expect("decode"), sent);
}

#[test]
fn every_kind_has_a_fixed_size() {
    for kind in UpdateKind::ALL {
        assert_eq!(UpdateKind::from_u8(kind.as_u8()), Some(kind));
    }
    assert_eq!(UpdateKind::Complete.payload_size(), 0);
    assert_eq!(UpdateKind::TickClosed.payload_size(), 24);
    assert_eq!(ActionKind::OpenBuy.payload_size(), 25);
    assert_eq!(ActionKind::ModifySellStopLoss.payload_size(), 12);
    assert_eq!(ActionKind::CloseSell.payload_size(), 4);
    assert_eq!(ActionKind::BidBelowTarget.payload_size(), 8);
}
