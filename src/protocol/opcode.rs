//! Opcode tables for both message directions.
//!
//! Ordinals follow declaration order and are part of the wire format:
//! reordering a variant is a protocol break.

use crate::protocol::types::{
    AccountBalance, AccountInfo, BarSnapshot, Position, RuntimeInfo, SymbolInfo, TickSnapshot,
    Trade, TradeSide, WireRecord,
};
use crate::protocol::wire::{F64_LEN, I32_LEN, U8_LEN};

/// Which half of the protocol an opcode belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Trading session to decision process.
    Update,
    /// Decision process to trading session.
    Action,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Update => f.write_str("update"),
            Direction::Action => f.write_str("action"),
        }
    }
}

/// One of the four price watch thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    AskAbove,
    AskBelow,
    BidAbove,
    BidBelow,
}

impl Target {
    /// Evaluation order used on every tick.
    pub const ALL: [Target; 4] = [
        Target::AskAbove,
        Target::AskBelow,
        Target::BidAbove,
        Target::BidBelow,
    ];
}

const BAR: usize = BarSnapshot::WIRE_LEN;
const BALANCE: usize = AccountBalance::WIRE_LEN;
const POSITION: usize = Position::WIRE_LEN;
const TRADE: usize = Trade::WIRE_LEN;
const TICK: usize = TickSnapshot::WIRE_LEN;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateKind {
    Complete = 0,
    Runtime = 1,
    Account = 2,
    Symbol = 3,
    OpenedBuy = 4,
    OpenedSell = 5,
    ModifiedBuyVolume = 6,
    ModifiedBuyStopLoss = 7,
    ModifiedBuyTakeProfit = 8,
    ModifiedSellVolume = 9,
    ModifiedSellStopLoss = 10,
    ModifiedSellTakeProfit = 11,
    ClosedBuy = 12,
    ClosedSell = 13,
    BarClosed = 14,
    TickClosed = 15,
    AskAboveTarget = 16,
    AskBelowTarget = 17,
    BidAboveTarget = 18,
    BidBelowTarget = 19,
    Shutdown = 20,
}

impl UpdateKind {
    pub const ALL: [UpdateKind; 21] = [
        UpdateKind::Complete,
        UpdateKind::Runtime,
        UpdateKind::Account,
        UpdateKind::Symbol,
        UpdateKind::OpenedBuy,
        UpdateKind::OpenedSell,
        UpdateKind::ModifiedBuyVolume,
        UpdateKind::ModifiedBuyStopLoss,
        UpdateKind::ModifiedBuyTakeProfit,
        UpdateKind::ModifiedSellVolume,
        UpdateKind::ModifiedSellStopLoss,
        UpdateKind::ModifiedSellTakeProfit,
        UpdateKind::ClosedBuy,
        UpdateKind::ClosedSell,
        UpdateKind::BarClosed,
        UpdateKind::TickClosed,
        UpdateKind::AskAboveTarget,
        UpdateKind::AskBelowTarget,
        UpdateKind::BidAboveTarget,
        UpdateKind::BidBelowTarget,
        UpdateKind::Shutdown,
    ];

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Payload bytes that follow this opcode.
    pub const fn payload_size(self) -> usize {
        match self {
            UpdateKind::Complete | UpdateKind::Shutdown => 0,
            UpdateKind::Runtime => RuntimeInfo::WIRE_LEN,
            UpdateKind::Account => AccountInfo::WIRE_LEN,
            UpdateKind::Symbol => SymbolInfo::WIRE_LEN,
            UpdateKind::OpenedBuy
            | UpdateKind::OpenedSell
            | UpdateKind::ModifiedBuyStopLoss
            | UpdateKind::ModifiedBuyTakeProfit
            | UpdateKind::ModifiedSellStopLoss
            | UpdateKind::ModifiedSellTakeProfit => BAR + BALANCE + POSITION,
            UpdateKind::ModifiedBuyVolume | UpdateKind::ModifiedSellVolume => {
                BAR + BALANCE + POSITION + TRADE
            }
            UpdateKind::ClosedBuy | UpdateKind::ClosedSell => BAR + BALANCE + TRADE,
            UpdateKind::BarClosed => BAR,
            UpdateKind::TickClosed
            | UpdateKind::AskAboveTarget
            | UpdateKind::AskBelowTarget
            | UpdateKind::BidAboveTarget
            | UpdateKind::BidBelowTarget => TICK,
        }
    }

    pub(crate) fn opened(side: TradeSide) -> Self {
        match side {
            TradeSide::Buy => UpdateKind::OpenedBuy,
            TradeSide::Sell => UpdateKind::OpenedSell,
        }
    }

    pub(crate) fn modified_volume(side: TradeSide) -> Self {
        match side {
            TradeSide::Buy => UpdateKind::ModifiedBuyVolume,
            TradeSide::Sell => UpdateKind::ModifiedSellVolume,
        }
    }

    pub(crate) fn modified_stop_loss(side: TradeSide) -> Self {
        match side {
            TradeSide::Buy => UpdateKind::ModifiedBuyStopLoss,
            TradeSide::Sell => UpdateKind::ModifiedSellStopLoss,
        }
    }

    pub(crate) fn modified_take_profit(side: TradeSide) -> Self {
        match side {
            TradeSide::Buy => UpdateKind::ModifiedBuyTakeProfit,
            TradeSide::Sell => UpdateKind::ModifiedSellTakeProfit,
        }
    }

    pub(crate) fn closed(side: TradeSide) -> Self {
        match side {
            TradeSide::Buy => UpdateKind::ClosedBuy,
            TradeSide::Sell => UpdateKind::ClosedSell,
        }
    }

    pub(crate) fn target(target: Target) -> Self {
        match target {
            Target::AskAbove => UpdateKind::AskAboveTarget,
            Target::AskBelow => UpdateKind::AskBelowTarget,
            Target::BidAbove => UpdateKind::BidAboveTarget,
            Target::BidBelow => UpdateKind::BidBelowTarget,
        }
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Complete = 0,
    OpenBuy = 1,
    OpenSell = 2,
    ModifyBuyVolume = 3,
    ModifyBuyStopLoss = 4,
    ModifyBuyTakeProfit = 5,
    ModifySellVolume = 6,
    ModifySellStopLoss = 7,
    ModifySellTakeProfit = 8,
    CloseBuy = 9,
    CloseSell = 10,
    AskAboveTarget = 11,
    AskBelowTarget = 12,
    BidAboveTarget = 13,
    BidBelowTarget = 14,
}

impl ActionKind {
    pub const ALL: [ActionKind; 15] = [
        ActionKind::Complete,
        ActionKind::OpenBuy,
        ActionKind::OpenSell,
        ActionKind::ModifyBuyVolume,
        ActionKind::ModifyBuyStopLoss,
        ActionKind::ModifyBuyTakeProfit,
        ActionKind::ModifySellVolume,
        ActionKind::ModifySellStopLoss,
        ActionKind::ModifySellTakeProfit,
        ActionKind::CloseBuy,
        ActionKind::CloseSell,
        ActionKind::AskAboveTarget,
        ActionKind::AskBelowTarget,
        ActionKind::BidAboveTarget,
        ActionKind::BidBelowTarget,
    ];

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    pub const fn payload_size(self) -> usize {
        match self {
            ActionKind::Complete => 0,
            ActionKind::OpenBuy | ActionKind::OpenSell => U8_LEN + 3 * F64_LEN,
            ActionKind::ModifyBuyVolume
            | ActionKind::ModifyBuyStopLoss
            | ActionKind::ModifyBuyTakeProfit
            | ActionKind::ModifySellVolume
            | ActionKind::ModifySellStopLoss
            | ActionKind::ModifySellTakeProfit => I32_LEN + F64_LEN,
            ActionKind::CloseBuy | ActionKind::CloseSell => I32_LEN,
            ActionKind::AskAboveTarget
            | ActionKind::AskBelowTarget
            | ActionKind::BidAboveTarget
            | ActionKind::BidBelowTarget => F64_LEN,
        }
    }

    /// Side implied by an order opcode; `None` for markers and targets.
    pub fn side(self) -> Option<TradeSide> {
        match self {
            ActionKind::OpenBuy
            | ActionKind::ModifyBuyVolume
            | ActionKind::ModifyBuyStopLoss
            | ActionKind::ModifyBuyTakeProfit
            | ActionKind::CloseBuy => Some(TradeSide::Buy),
            ActionKind::OpenSell
            | ActionKind::ModifySellVolume
            | ActionKind::ModifySellStopLoss
            | ActionKind::ModifySellTakeProfit
            | ActionKind::CloseSell => Some(TradeSide::Sell),
            _ => None,
        }
    }

    pub fn target(self) -> Option<Target> {
        match self {
            ActionKind::AskAboveTarget => Some(Target::AskAbove),
            ActionKind::AskBelowTarget => Some(Target::AskBelow),
            ActionKind::BidAboveTarget => Some(Target::BidAbove),
            ActionKind::BidBelowTarget => Some(Target::BidBelow),
            _ => None,
        }
    }
}
