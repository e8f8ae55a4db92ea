#![allow(dead_code)]

use tradebridge::error::{BridgeError, HostError};
use tradebridge::protocol::{
    AccountBalance, AccountInfo, AccountType, Asset, CommissionType, MarginCalculationType,
    OpenRequest, Position, PositionType, RunMode, RuntimeInfo, SwapCalculationType, SymbolInfo,
    TickAccuracy, TradeSide, Weekday,
};
use tradebridge::trading::{Tick, TradingHost};

/// Host that records every order call and can be told to fail one kind.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub calls: Vec<String>,
    pub fail_close: bool,
    pub stop_reason: Option<String>,
}

impl TradingHost for RecordingHost {
    fn open_position(&mut self, side: TradeSide, request: &OpenRequest) -> Result<(), HostError> {
        self.calls
            .push(format!("open {} {}", side.label(), request.volume));
        Ok(())
    }

    fn modify_volume(&mut self, _: TradeSide, id: i32, volume: f64) -> Result<(), HostError> {
        self.calls.push(format!("volume {id} {volume}"));
        Ok(())
    }

    fn modify_stop_loss(
        &mut self,
        _: TradeSide,
        id: i32,
        price: Option<f64>,
    ) -> Result<(), HostError> {
        self.calls.push(format!("sl {id} {price:?}"));
        Ok(())
    }

    fn modify_take_profit(
        &mut self,
        _: TradeSide,
        id: i32,
        price: Option<f64>,
    ) -> Result<(), HostError> {
        self.calls.push(format!("tp {id} {price:?}"));
        Ok(())
    }

    fn close_position(&mut self, side: TradeSide, id: i32) -> Result<(), HostError> {
        self.calls.push(format!("close {} {id}", side.label()));
        if self.fail_close {
            return Err("position is locked".into());
        }
        Ok(())
    }

    fn stop(&mut self, reason: &BridgeError) {
        self.stop_reason = Some(reason.to_string());
    }
}

pub fn tick(time_ms: i64, ask: f64, bid: f64) -> Tick {
    Tick {
        time_ms,
        ask,
        bid,
        ..Tick::default()
    }
}

pub fn runtime() -> RuntimeInfo {
    RuntimeInfo {
        run_mode: RunMode::SilentBacktesting,
        tick_accuracy: TickAccuracy::Ticks,
    }
}

pub fn account() -> AccountInfo {
    AccountInfo {
        balance: 10_000.0,
        equity: 10_000.0,
        account_type: AccountType::Hedged,
        asset: Asset(3),
        credit: 0.0,
        leverage: 500.0,
        margin: 0.0,
        free_margin: 10_000.0,
        margin_level: None,
        stop_out_level: 50.0,
        margin_calculation: MarginCalculationType::Max,
    }
}

pub fn balance() -> AccountBalance {
    AccountBalance {
        balance: 10_000.0,
        equity: 10_000.0,
    }
}

pub fn symbol() -> SymbolInfo {
    SymbolInfo {
        base_asset: Asset(1),
        quote_asset: Asset(3),
        digits: 5,
        pip_size: 0.0001,
        tick_size: 0.00001,
        lot_size: 100_000.0,
        min_volume: 1000.0,
        max_volume: 100_000_000.0,
        step_volume: 1000.0,
        commission: 30.0,
        commission_type: CommissionType::UsdPerMillionUsdVolume,
        swap_long: -6.5,
        swap_short: 1.2,
        swap_calculation: SwapCalculationType::Pips,
        triple_swap_day: Some(Weekday::Wednesday),
    }
}

pub fn position(id: i32, volume: f64, stop_loss: Option<f64>, take_profit: Option<f64>) -> Position {
    Position {
        id,
        position_type: PositionType(0),
        side: TradeSide::Buy,
        entry_time_ms: 1_700_000_000_000,
        entry_price: 1.0850,
        volume,
        stop_loss,
        take_profit,
    }
}
