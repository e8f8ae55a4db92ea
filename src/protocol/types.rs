//! Snapshot records carried inside Update and Action payloads.
//!
//! Each record has a fixed wire length and a fixed field order. Enumerations
//! travel as their one-byte ordinal in declaration order.

use crate::error::ProtocolError;
use crate::protocol::wire::{WireReader, WireWriter, F64_LEN, I32_LEN, I64_LEN, U8_LEN};

/// A fixed-width record with a bit-exact little-endian layout.
pub trait WireRecord: Sized {
    const WIRE_LEN: usize;

    fn write(&self, w: &mut WireWriter);

    fn read(r: &mut WireReader<'_>) -> Result<Self, ProtocolError>;
}

wire_enum! {
    /// Direction of a position or trade.
    TradeSide, "trade_side" {
        Buy = 0,
        Sell = 1,
    }
}

impl TradeSide {
    pub fn label(self) -> &'static str {
        match self {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        }
    }
}

wire_enum! {
    /// How the host is executing the trading session.
    RunMode, "run_mode" {
        RealTime = 0,
        SilentBacktesting = 1,
        VisualBacktesting = 2,
        Optimization = 3,
    }
}

wire_enum! {
    /// Granularity of the price data feeding the session.
    TickAccuracy, "tick_accuracy" {
        Ticks = 0,
        M1Bars = 1,
        OpenPrices = 2,
    }
}

wire_enum! {
    AccountType, "account_type" {
        Hedged = 0,
        Netted = 1,
        SpreadBetting = 2,
    }
}

wire_enum! {
    MarginCalculationType, "margin_calculation_type" {
        Max = 0,
        Sum = 1,
        Net = 2,
    }
}

wire_enum! {
    CommissionType, "commission_type" {
        UsdPerMillionUsdVolume = 0,
        UsdPerLot = 1,
        PercentageOfVolume = 2,
        QuoteCurrencyPerLot = 3,
    }
}

wire_enum! {
    SwapCalculationType, "swap_calculation_type" {
        Pips = 0,
        Percentage = 1,
        Points = 2,
    }
}

wire_enum! {
    Weekday, "weekday" {
        Sunday = 0,
        Monday = 1,
        Tuesday = 2,
        Wednesday = 3,
        Thursday = 4,
        Friday = 5,
        Saturday = 6,
    }
}

/// Strategy-defined position class, carried opaquely between the peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PositionType(pub u8);

/// Host asset ordinal (currency, metal, index...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Asset(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeInfo {
    pub run_mode: RunMode,
    pub tick_accuracy: TickAccuracy,
}

impl WireRecord for RuntimeInfo {
    const WIRE_LEN: usize = 2 * U8_LEN;

    fn write(&self, w: &mut WireWriter) {
        w.put_u8(self.run_mode.as_u8());
        w.put_u8(self.tick_accuracy.as_u8());
    }

    fn read(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        r.require(Self::WIRE_LEN)?;
        Ok(Self {
            run_mode: RunMode::try_from(r.u8()?)?,
            tick_accuracy: TickAccuracy::try_from(r.u8()?)?,
        })
    }
}

/// Balance and equity, attached to every position event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AccountBalance {
    pub balance: f64,
    pub equity: f64,
}

impl WireRecord for AccountBalance {
    const WIRE_LEN: usize = 2 * F64_LEN;

    fn write(&self, w: &mut WireWriter) {
        w.put_f64(self.balance);
        w.put_f64(self.equity);
    }

    fn read(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        r.require(Self::WIRE_LEN)?;
        Ok(Self {
            balance: r.f64()?,
            equity: r.f64()?,
        })
    }
}

/// Full account snapshot sent once at session start.
///
/// The first sixteen bytes are laid out exactly like [`AccountBalance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountInfo {
    pub balance: f64,
    pub equity: f64,
    pub account_type: AccountType,
    pub asset: Asset,
    pub credit: f64,
    pub leverage: f64,
    pub margin: f64,
    pub free_margin: f64,
    /// `None` while no margin is used.
    pub margin_level: Option<f64>,
    pub stop_out_level: f64,
    pub margin_calculation: MarginCalculationType,
}

impl AccountInfo {
    pub fn balance(&self) -> AccountBalance {
        AccountBalance {
            balance: self.balance,
            equity: self.equity,
        }
    }
}

impl WireRecord for AccountInfo {
    const WIRE_LEN: usize = 8 * F64_LEN + 3 * U8_LEN;

    fn write(&self, w: &mut WireWriter) {
        w.put_f64(self.balance);
        w.put_f64(self.equity);
        w.put_u8(self.account_type.as_u8());
        w.put_u8(self.asset.0);
        w.put_f64(self.credit);
        w.put_f64(self.leverage);
        w.put_f64(self.margin);
        w.put_f64(self.free_margin);
        w.put_opt_f64(self.margin_level);
        w.put_f64(self.stop_out_level);
        w.put_u8(self.margin_calculation.as_u8());
    }

    fn read(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        r.require(Self::WIRE_LEN)?;
        Ok(Self {
            balance: r.f64()?,
            equity: r.f64()?,
            account_type: AccountType::try_from(r.u8()?)?,
            asset: Asset(r.u8()?),
            credit: r.f64()?,
            leverage: r.f64()?,
            margin: r.f64()?,
            free_margin: r.f64()?,
            margin_level: r.opt_f64()?,
            stop_out_level: r.f64()?,
            margin_calculation: MarginCalculationType::try_from(r.u8()?)?,
        })
    }
}

/// Static description of the traded instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolInfo {
    pub base_asset: Asset,
    pub quote_asset: Asset,
    pub digits: i32,
    pub pip_size: f64,
    pub tick_size: f64,
    pub lot_size: f64,
    pub min_volume: f64,
    pub max_volume: f64,
    pub step_volume: f64,
    pub commission: f64,
    pub commission_type: CommissionType,
    pub swap_long: f64,
    pub swap_short: f64,
    pub swap_calculation: SwapCalculationType,
    /// Day on which triple swap is charged, if the symbol has one.
    pub triple_swap_day: Option<Weekday>,
}

impl WireRecord for SymbolInfo {
    const WIRE_LEN: usize = 5 * U8_LEN + I32_LEN + 9 * F64_LEN;

    fn write(&self, w: &mut WireWriter) {
        w.put_u8(self.base_asset.0);
        w.put_u8(self.quote_asset.0);
        w.put_i32(self.digits);
        w.put_f64(self.pip_size);
        w.put_f64(self.tick_size);
        w.put_f64(self.lot_size);
        w.put_f64(self.min_volume);
        w.put_f64(self.max_volume);
        w.put_f64(self.step_volume);
        w.put_f64(self.commission);
        w.put_u8(self.commission_type.as_u8());
        w.put_f64(self.swap_long);
        w.put_f64(self.swap_short);
        w.put_u8(self.swap_calculation.as_u8());
        w.put_opt_i8(self.triple_swap_day.map(|day| day.as_u8() as i8));
    }

    fn read(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        r.require(Self::WIRE_LEN)?;
        Ok(Self {
            base_asset: Asset(r.u8()?),
            quote_asset: Asset(r.u8()?),
            digits: r.i32()?,
            pip_size: r.f64()?,
            tick_size: r.f64()?,
            lot_size: r.f64()?,
            min_volume: r.f64()?,
            max_volume: r.f64()?,
            step_volume: r.f64()?,
            commission: r.f64()?,
            commission_type: CommissionType::try_from(r.u8()?)?,
            swap_long: r.f64()?,
            swap_short: r.f64()?,
            swap_calculation: SwapCalculationType::try_from(r.u8()?)?,
            triple_swap_day: match r.opt_i8()? {
                None => None,
                Some(day) => Some(Weekday::try_from(day as u8)?),
            },
        })
    }
}

/// An open position as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub id: i32,
    pub position_type: PositionType,
    pub side: TradeSide,
    pub entry_time_ms: i64,
    pub entry_price: f64,
    pub volume: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl WireRecord for Position {
    const WIRE_LEN: usize = I32_LEN + 2 * U8_LEN + I64_LEN + 4 * F64_LEN;

    fn write(&self, w: &mut WireWriter) {
        w.put_i32(self.id);
        w.put_u8(self.position_type.0);
        w.put_u8(self.side.as_u8());
        w.put_i64(self.entry_time_ms);
        w.put_f64(self.entry_price);
        w.put_f64(self.volume);
        w.put_opt_f64(self.stop_loss);
        w.put_opt_f64(self.take_profit);
    }

    fn read(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        r.require(Self::WIRE_LEN)?;
        Ok(Self {
            id: r.i32()?,
            position_type: PositionType(r.u8()?),
            side: TradeSide::try_from(r.u8()?)?,
            entry_time_ms: r.i64()?,
            entry_price: r.f64()?,
            volume: r.f64()?,
            stop_loss: r.opt_f64()?,
            take_profit: r.opt_f64()?,
        })
    }
}

/// A closing deal: a full close or the closed part of a volume reduction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trade {
    pub position_id: i32,
    pub closing_deal_id: i64,
    pub position_type: PositionType,
    pub side: TradeSide,
    pub entry_time_ms: i64,
    pub closing_time_ms: i64,
    pub entry_price: f64,
    pub closing_price: f64,
    pub volume: f64,
    pub gross_profit: f64,
    pub commissions: f64,
    pub swap: f64,
    pub pips: f64,
    pub net_profit: f64,
}

impl Trade {
    /// Placeholder deal for a volume change the host did not report a deal
    /// for. Monetary fields are zero.
    pub fn without_deal(position: &Position, time_ms: i64) -> Self {
        Self {
            position_id: position.id,
            closing_deal_id: 0,
            position_type: position.position_type,
            side: position.side,
            entry_time_ms: position.entry_time_ms,
            closing_time_ms: time_ms,
            entry_price: position.entry_price,
            closing_price: position.entry_price,
            volume: 0.0,
            gross_profit: 0.0,
            commissions: 0.0,
            swap: 0.0,
            pips: 0.0,
            net_profit: 0.0,
        }
    }
}

impl WireRecord for Trade {
    const WIRE_LEN: usize = I32_LEN + 3 * I64_LEN + 2 * U8_LEN + 8 * F64_LEN;

    fn write(&self, w: &mut WireWriter) {
        w.put_i32(self.position_id);
        w.put_i64(self.closing_deal_id);
        w.put_u8(self.position_type.0);
        w.put_u8(self.side.as_u8());
        w.put_i64(self.entry_time_ms);
        w.put_i64(self.closing_time_ms);
        w.put_f64(self.entry_price);
        w.put_f64(self.closing_price);
        w.put_f64(self.volume);
        w.put_f64(self.gross_profit);
        w.put_f64(self.commissions);
        w.put_f64(self.swap);
        w.put_f64(self.pips);
        w.put_f64(self.net_profit);
    }

    fn read(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        r.require(Self::WIRE_LEN)?;
        Ok(Self {
            position_id: r.i32()?,
            closing_deal_id: r.i64()?,
            position_type: PositionType(r.u8()?),
            side: TradeSide::try_from(r.u8()?)?,
            entry_time_ms: r.i64()?,
            closing_time_ms: r.i64()?,
            entry_price: r.f64()?,
            closing_price: r.f64()?,
            volume: r.f64()?,
            gross_profit: r.f64()?,
            commissions: r.f64()?,
            swap: r.f64()?,
            pips: r.f64()?,
            net_profit: r.f64()?,
        })
    }
}

/// OHLC projection of the current bar.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BarSnapshot {
    pub open_time_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub tick_volume: f64,
}

impl WireRecord for BarSnapshot {
    const WIRE_LEN: usize = I64_LEN + 5 * F64_LEN;

    fn write(&self, w: &mut WireWriter) {
        w.put_i64(self.open_time_ms);
        w.put_f64(self.open);
        w.put_f64(self.high);
        w.put_f64(self.low);
        w.put_f64(self.close);
        w.put_f64(self.tick_volume);
    }

    fn read(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        r.require(Self::WIRE_LEN)?;
        Ok(Self {
            open_time_ms: r.i64()?,
            open: r.f64()?,
            high: r.f64()?,
            low: r.f64()?,
            close: r.f64()?,
            tick_volume: r.f64()?,
        })
    }
}

/// Time and top of book for a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickSnapshot {
    pub time_ms: i64,
    pub ask: f64,
    pub bid: f64,
}

impl WireRecord for TickSnapshot {
    const WIRE_LEN: usize = I64_LEN + 2 * F64_LEN;

    fn write(&self, w: &mut WireWriter) {
        w.put_i64(self.time_ms);
        w.put_f64(self.ask);
        w.put_f64(self.bid);
    }

    fn read(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        r.require(Self::WIRE_LEN)?;
        Ok(Self {
            time_ms: r.i64()?,
            ask: r.f64()?,
            bid: r.f64()?,
        })
    }
}
