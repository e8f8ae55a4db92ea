//! Messages from the decision process back to the trading session.

use crate::error::ProtocolError;
use crate::protocol::opcode::{ActionKind, Direction, Target};
use crate::protocol::types::{PositionType, TradeSide};
use crate::protocol::wire::{WireReader, WireWriter};
use crate::protocol::OPCODE_LEN;

/// Parameters of a market order.
///
/// Protective levels are distances in pips from the entry price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenRequest {
    pub position_type: PositionType,
    pub volume: f64,
    pub stop_loss_pips: Option<f64>,
    pub take_profit_pips: Option<f64>,
}

/// An instruction from the decision process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// End of burst.
    Complete,
    Open(TradeSide, OpenRequest),
    ModifyVolume {
        side: TradeSide,
        position_id: i32,
        volume: f64,
    },
    /// `price: None` removes the stop-loss.
    ModifyStopLoss {
        side: TradeSide,
        position_id: i32,
        price: Option<f64>,
    },
    /// `price: None` removes the take-profit.
    ModifyTakeProfit {
        side: TradeSide,
        position_id: i32,
        price: Option<f64>,
    },
    Close {
        side: TradeSide,
        position_id: i32,
    },
    /// Replaces a watch threshold; `None` disarms it.
    SetTarget(Target, Option<f64>),
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        use TradeSide::{Buy, Sell};
        match self {
            Action::Complete => ActionKind::Complete,
            Action::Open(Buy, _) => ActionKind::OpenBuy,
            Action::Open(Sell, _) => ActionKind::OpenSell,
            Action::ModifyVolume { side: Buy, .. } => ActionKind::ModifyBuyVolume,
            Action::ModifyVolume { side: Sell, .. } => ActionKind::ModifySellVolume,
            Action::ModifyStopLoss { side: Buy, .. } => ActionKind::ModifyBuyStopLoss,
            Action::ModifyStopLoss { side: Sell, .. } => ActionKind::ModifySellStopLoss,
            Action::ModifyTakeProfit { side: Buy, .. } => ActionKind::ModifyBuyTakeProfit,
            Action::ModifyTakeProfit { side: Sell, .. } => ActionKind::ModifySellTakeProfit,
            Action::Close { side: Buy, .. } => ActionKind::CloseBuy,
            Action::Close { side: Sell, .. } => ActionKind::CloseSell,
            Action::SetTarget(Target::AskAbove, _) => ActionKind::AskAboveTarget,
            Action::SetTarget(Target::AskBelow, _) => ActionKind::AskBelowTarget,
            Action::SetTarget(Target::BidAbove, _) => ActionKind::BidAboveTarget,
            Action::SetTarget(Target::BidBelow, _) => ActionKind::BidBelowTarget,
        }
    }

    pub fn wire_len(&self) -> usize {
        OPCODE_LEN + self.kind().payload_size()
    }

    pub fn encode_into(&self, w: &mut WireWriter) {
        w.put_u8(self.kind().as_u8());
        match self {
            Action::Complete => {}
            Action::Open(_, request) => {
                w.put_u8(request.position_type.0);
                w.put_f64(request.volume);
                w.put_opt_f64(request.stop_loss_pips);
                w.put_opt_f64(request.take_profit_pips);
            }
            Action::ModifyVolume {
                position_id,
                volume,
                ..
            } => {
                w.put_i32(*position_id);
                w.put_f64(*volume);
            }
            Action::ModifyStopLoss {
                position_id, price, ..
            }
            | Action::ModifyTakeProfit {
                position_id, price, ..
            } => {
                w.put_i32(*position_id);
                w.put_opt_f64(*price);
            }
            Action::Close { position_id, .. } => w.put_i32(*position_id),
            Action::SetTarget(_, price) => w.put_opt_f64(*price),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = WireWriter::with_capacity(self.wire_len());
        self.encode_into(&mut w);
        w.into_bytes()
    }

    /// Decodes the payload that followed `opcode`.
    pub fn decode(opcode: u8, payload: &[u8]) -> Result<Self, ProtocolError> {
        let kind = ActionKind::from_u8(opcode).ok_or(ProtocolError::UnknownOpcode {
            direction: Direction::Action,
            opcode,
        })?;
        let mut r = WireReader::new(opcode, payload);
        r.require(kind.payload_size())?;

        if kind == ActionKind::Complete {
            return Ok(Action::Complete);
        }
        if let Some(target) = kind.target() {
            return Ok(Action::SetTarget(target, r.opt_f64()?));
        }
        // every remaining opcode names a side
        let side = match kind.side() {
            Some(side) => side,
            None => {
                return Err(ProtocolError::UnknownOpcode {
                    direction: Direction::Action,
                    opcode,
                })
            }
        };
        let action = match kind {
            ActionKind::OpenBuy | ActionKind::OpenSell => Action::Open(
                side,
                OpenRequest {
                    position_type: PositionType(r.u8()?),
                    volume: r.f64()?,
                    stop_loss_pips: r.opt_f64()?,
                    take_profit_pips: r.opt_f64()?,
                },
            ),
            ActionKind::ModifyBuyVolume | ActionKind::ModifySellVolume => Action::ModifyVolume {
                side,
                position_id: r.i32()?,
                volume: r.f64()?,
            },
            ActionKind::ModifyBuyStopLoss | ActionKind::ModifySellStopLoss => {
                Action::ModifyStopLoss {
                    side,
                    position_id: r.i32()?,
                    price: r.opt_f64()?,
                }
            }
            ActionKind::ModifyBuyTakeProfit | ActionKind::ModifySellTakeProfit => {
                Action::ModifyTakeProfit {
                    side,
                    position_id: r.i32()?,
                    price: r.opt_f64()?,
                }
            }
            _ => Action::Close {
                side,
                position_id: r.i32()?,
            },
        };
        Ok(action)
    }

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_buy_is_five_bytes() {
        let bytes = Action::Close {
            side: TradeSide::Buy,
            position_id: 42,
        }
        .encode();
        assert_eq!(
            bytes,
            vec![ActionKind::CloseBuy.as_u8(), 0x2A, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn open_with_absent_protection() {
        let action = Action::Open(
            TradeSide::Sell,
            OpenRequest {
                position_type: PositionType(3),
                volume: 1000.0,
                stop_loss_pips: None,
                take_profit_pips: Some(25.0),
            },
        );
        let bytes = action.encode();
        assert_eq!(bytes.len(), 26);
        assert_eq!(&bytes[10..18], &(-1.0f64).to_le_bytes());
        assert_eq!(Action::decode_message(&bytes).unwrap(), action);
    }

    #[test]
    fn target_price_of_minus_one_reads_as_disarm() {
        let bytes = Action::SetTarget(Target::BidBelow, Some(-1.0)).encode();
        assert_eq!(
            Action::decode_message(&bytes).unwrap(),
            Action::SetTarget(Target::BidBelow, None)
        );
    }

    #[test]
    fn unknown_opcode() {
        assert_eq!(
            Action::decode(15, &[]).unwrap_err(),
            ProtocolError::UnknownOpcode {
                direction: Direction::Action,
                opcode: 15
            }
        );
    }

    #[test]
    fn truncated_modify() {
        let bytes = Action::ModifyVolume {
            side: TradeSide::Buy,
            position_id: 9,
            volume: 500.0,
        }
        .encode();
        assert!(matches!(
            Action::decode(bytes[0], &bytes[1..6]),
            Err(ProtocolError::Truncated { needed: 12, available: 5, .. })
        ));
    }
}
