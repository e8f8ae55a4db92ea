//! Messages from the trading session to the decision process.

use crate::error::ProtocolError;
use crate::protocol::opcode::{Direction, Target, UpdateKind};
use crate::protocol::types::{
    AccountBalance, AccountInfo, BarSnapshot, Position, RuntimeInfo, SymbolInfo, TickSnapshot,
    Trade, TradeSide, WireRecord,
};
use crate::protocol::wire::{WireReader, WireWriter};
use crate::protocol::OPCODE_LEN;

/// Payload of open, stop-loss and take-profit events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionEvent {
    pub bar: BarSnapshot,
    pub account: AccountBalance,
    pub position: Position,
}

impl WireRecord for PositionEvent {
    const WIRE_LEN: usize = BarSnapshot::WIRE_LEN + AccountBalance::WIRE_LEN + Position::WIRE_LEN;

    fn write(&self, w: &mut WireWriter) {
        self.bar.write(w);
        self.account.write(w);
        self.position.write(w);
    }

    fn read(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        r.require(Self::WIRE_LEN)?;
        Ok(Self {
            bar: BarSnapshot::read(r)?,
            account: AccountBalance::read(r)?,
            position: Position::read(r)?,
        })
    }
}

/// Payload of a volume change; `trade` is the deal that changed the volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeEvent {
    pub bar: BarSnapshot,
    pub account: AccountBalance,
    pub position: Position,
    pub trade: Trade,
}

impl WireRecord for VolumeEvent {
    const WIRE_LEN: usize = PositionEvent::WIRE_LEN + Trade::WIRE_LEN;

    fn write(&self, w: &mut WireWriter) {
        self.bar.write(w);
        self.account.write(w);
        self.position.write(w);
        self.trade.write(w);
    }

    fn read(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        r.require(Self::WIRE_LEN)?;
        Ok(Self {
            bar: BarSnapshot::read(r)?,
            account: AccountBalance::read(r)?,
            position: Position::read(r)?,
            trade: Trade::read(r)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosedEvent {
    pub bar: BarSnapshot,
    pub account: AccountBalance,
    pub trade: Trade,
}

impl WireRecord for ClosedEvent {
    const WIRE_LEN: usize = BarSnapshot::WIRE_LEN + AccountBalance::WIRE_LEN + Trade::WIRE_LEN;

    fn write(&self, w: &mut WireWriter) {
        self.bar.write(w);
        self.account.write(w);
        self.trade.write(w);
    }

    fn read(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        r.require(Self::WIRE_LEN)?;
        Ok(Self {
            bar: BarSnapshot::read(r)?,
            account: AccountBalance::read(r)?,
            trade: Trade::read(r)?,
        })
    }
}

/// An event reported to the decision process.
///
/// The side carried by position variants selects the Buy or Sell opcode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Update {
    /// End of burst.
    Complete,
    Runtime(RuntimeInfo),
    Account(AccountInfo),
    Symbol(SymbolInfo),
    Opened(TradeSide, PositionEvent),
    ModifiedVolume(TradeSide, VolumeEvent),
    ModifiedStopLoss(TradeSide, PositionEvent),
    ModifiedTakeProfit(TradeSide, PositionEvent),
    Closed(TradeSide, ClosedEvent),
    BarClosed(BarSnapshot),
    TickClosed(TickSnapshot),
    TargetReached(Target, TickSnapshot),
    Shutdown,
}

impl Update {
    pub fn kind(&self) -> UpdateKind {
        match self {
            Update::Complete => UpdateKind::Complete,
            Update::Runtime(_) => UpdateKind::Runtime,
            Update::Account(_) => UpdateKind::Account,
            Update::Symbol(_) => UpdateKind::Symbol,
            Update::Opened(side, _) => UpdateKind::opened(*side),
            Update::ModifiedVolume(side, _) => UpdateKind::modified_volume(*side),
            Update::ModifiedStopLoss(side, _) => UpdateKind::modified_stop_loss(*side),
            Update::ModifiedTakeProfit(side, _) => UpdateKind::modified_take_profit(*side),
            Update::Closed(side, _) => UpdateKind::closed(*side),
            Update::BarClosed(_) => UpdateKind::BarClosed,
            Update::TickClosed(_) => UpdateKind::TickClosed,
            Update::TargetReached(target, _) => UpdateKind::target(*target),
            Update::Shutdown => UpdateKind::Shutdown,
        }
    }

    /// Full message length including the opcode.
    pub fn wire_len(&self) -> usize {
        OPCODE_LEN + self.kind().payload_size()
    }

    /// Appends opcode and payload to `w`.
    pub fn encode_into(&self, w: &mut WireWriter) {
        w.put_u8(self.kind().as_u8());
        match self {
            Update::Complete | Update::Shutdown => {}
            Update::Runtime(info) => info.write(w),
            Update::Account(info) => info.write(w),
            Update::Symbol(info) => info.write(w),
            Update::Opened(_, event)
            | Update::ModifiedStopLoss(_, event)
            | Update::ModifiedTakeProfit(_, event) => event.write(w),
            Update::ModifiedVolume(_, event) => event.write(w),
            Update::Closed(_, event) => event.write(w),
            Update::BarClosed(bar) => bar.write(w),
            Update::TickClosed(tick) | Update::TargetReached(_, tick) => tick.write(w),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = WireWriter::with_capacity(self.wire_len());
        self.encode_into(&mut w);
        w.into_bytes()
    }

    /// Decodes the payload that followed `opcode`.
    pub fn decode(opcode: u8, payload: &[u8]) -> Result<Self, ProtocolError> {
        let kind = UpdateKind::from_u8(opcode).ok_or(ProtocolError::UnknownOpcode {
            direction: Direction::Update,
            opcode,
        })?;
        let mut r = WireReader::new(opcode, payload);
        r.require(kind.payload_size())?;
        let update = match kind {
            UpdateKind::Complete => Update::Complete,
            UpdateKind::Shutdown => Update::Shutdown,
            UpdateKind::Runtime => Update::Runtime(RuntimeInfo::read(&mut r)?),
            UpdateKind::Account => Update::Account(AccountInfo::read(&mut r)?),
            UpdateKind::Symbol => Update::Symbol(SymbolInfo::read(&mut r)?),
            UpdateKind::OpenedBuy => Update::Opened(TradeSide::Buy, PositionEvent::read(&mut r)?),
            UpdateKind::OpenedSell => Update::Opened(TradeSide::Sell, PositionEvent::read(&mut r)?),
            UpdateKind::ModifiedBuyVolume => {
                Update::ModifiedVolume(TradeSide::Buy, VolumeEvent::read(&mut r)?)
            }
            UpdateKind::ModifiedSellVolume => {
                Update::ModifiedVolume(TradeSide::Sell, VolumeEvent::read(&mut r)?)
            }
            UpdateKind::ModifiedBuyStopLoss => {
                Update::ModifiedStopLoss(TradeSide::Buy, PositionEvent::read(&mut r)?)
            }
            UpdateKind::ModifiedSellStopLoss => {
                Update::ModifiedStopLoss(TradeSide::Sell, PositionEvent::read(&mut r)?)
            }
            UpdateKind::ModifiedBuyTakeProfit => {
                Update::ModifiedTakeProfit(TradeSide::Buy, PositionEvent::read(&mut r)?)
            }
            UpdateKind::ModifiedSellTakeProfit => {
                Update::ModifiedTakeProfit(TradeSide::Sell, PositionEvent::read(&mut r)?)
            }
            UpdateKind::ClosedBuy => Update::Closed(TradeSide::Buy, ClosedEvent::read(&mut r)?),
            UpdateKind::ClosedSell => Update::Closed(TradeSide::Sell, ClosedEvent::read(&mut r)?),
            UpdateKind::BarClosed => Update::BarClosed(BarSnapshot::read(&mut r)?),
            UpdateKind::TickClosed => Update::TickClosed(TickSnapshot::read(&mut r)?),
            UpdateKind::AskAboveTarget => {
                Update::TargetReached(Target::AskAbove, TickSnapshot::read(&mut r)?)
            }
            UpdateKind::AskBelowTarget => {
                Update::TargetReached(Target::AskBelow, TickSnapshot::read(&mut r)?)
            }
            UpdateKind::BidAboveTarget => {
                Update::TargetReached(Target::BidAbove, TickSnapshot::read(&mut r)?)
            }
            UpdateKind::BidBelowTarget => {
                Update::TargetReached(Target::BidBelow, TickSnapshot::read(&mut r)?)
            }
        };
        Ok(update)
    }

    /// Decodes a complete message (opcode followed by payload).
    pub fn decode_message(bytes: &[u8]) -> Result<Self, ProtocolError> {
        match bytes.split_first() {
            Some((&opcode, payload)) => Self::decode(opcode, payload),
            None => Err(ProtocolError::Truncated {
                opcode: 0,
                needed: OPCODE_LEN,
                available: 0,
            }),
        }
    }
}
