//! Reads and applies the decision process's Action burst.
//!
//! ```text
//!            ┌──────────────┐ opcode+payload ┌──────────────┐
//!   start ──►│   Reading    │───────────────►│   Applying   │
//!            └──────────────┘◄───────────────└──────────────┘
//!                   │ Complete        ok             │ rejected / failed
//!                   ▼                                ▼
//!              round done                      session stops
//! ```
//!
//! A failing Action ends the burst immediately: nothing after it is read,
//! let alone applied. Order failures are never retried.

use log::{debug, error};

use crate::error::{BridgeError, ExecutionError, OrderOperation, ProtocolError, Result};
use crate::ipc::Channel;
use crate::protocol::{Action, ActionKind, Direction, OpenRequest};
use crate::trading::host::TradingHost;
use crate::trading::targets::WatchTargets;

/// Applies Actions to the host and owns the watch thresholds they set.
#[derive(Debug, Default)]
pub struct ActionDispatcher {
    targets: WatchTargets,
    rounds: u64,
    applied: u64,
    payload: Vec<u8>,
}

impl ActionDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn targets(&self) -> &WatchTargets {
        &self.targets
    }

    pub fn targets_mut(&mut self) -> &mut WatchTargets {
        &mut self.targets
    }

    /// Completed rounds so far.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Actions applied over the dispatcher's lifetime, markers excluded.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Reads Actions from `channel` and applies them until `Complete`.
    ///
    /// Returns how many Actions were applied in this burst. Blocks for as
    /// long as the peer stays silent.
    pub fn run_burst<H: TradingHost>(&mut self, channel: &mut Channel, host: &mut H) -> Result<usize> {
        let mut applied = 0usize;
        loop {
            let action = self.read_action(channel)?;
            if action == Action::Complete {
                break;
            }
            self.apply(&action, host)?;
            applied += 1;
            self.applied += 1;
        }
        self.rounds += 1;
        debug!("round {} complete: {} action(s) applied", self.rounds, applied);
        Ok(applied)
    }

    fn read_action(&mut self, channel: &mut Channel) -> Result<Action> {
        let opcode = channel.recv_u8()?;
        let kind = ActionKind::from_u8(opcode).ok_or(ProtocolError::UnknownOpcode {
            direction: Direction::Action,
            opcode,
        })?;
        self.payload.resize(kind.payload_size(), 0);
        channel.recv_into(&mut self.payload)?;
        Ok(Action::decode(opcode, &self.payload)?)
    }

    /// Validates and applies a single Action.
    pub fn apply<H: TradingHost>(&mut self, action: &Action, host: &mut H) -> Result<()> {
        validate(action)?;
        debug!("applying {:?}", action);
        let outcome = match *action {
            Action::Complete => return Ok(()),
            Action::SetTarget(target, price) => {
                self.targets.set(target, price);
                return Ok(());
            }
            Action::Open(side, ref request) => host
                .open_position(side, request)
                .map_err(|source| (OrderOperation::Open, None, source)),
            Action::ModifyVolume {
                side,
                position_id,
                volume,
            } => host
                .modify_volume(side, position_id, volume)
                .map_err(|source| (OrderOperation::ModifyVolume, Some(position_id), source)),
            Action::ModifyStopLoss {
                side,
                position_id,
                price,
            } => host
                .modify_stop_loss(side, position_id, price)
                .map_err(|source| (OrderOperation::ModifyStopLoss, Some(position_id), source)),
            Action::ModifyTakeProfit {
                side,
                position_id,
                price,
            } => host
                .modify_take_profit(side, position_id, price)
                .map_err(|source| (OrderOperation::ModifyTakeProfit, Some(position_id), source)),
            Action::Close { side, position_id } => host
                .close_position(side, position_id)
                .map_err(|source| (OrderOperation::Close, Some(position_id), source)),
        };
        outcome.map_err(|(operation, position_id, source)| {
            let err = ExecutionError {
                operation,
                position_id,
                source,
            };
            error!("{}; stopping trading session", err);
            BridgeError::Execution(err)
        })
    }
}

/// Semantic checks the codec does not perform.
pub fn validate(action: &Action) -> Result<()> {
    let reject = |reason: &'static str| {
        Err(BridgeError::InvalidAction {
            opcode: action.kind().as_u8(),
            reason,
        })
    };
    match *action {
        Action::Complete => Ok(()),
        Action::Open(_, OpenRequest {
            volume,
            stop_loss_pips,
            take_profit_pips,
            ..
        }) => {
            if !is_positive(volume) {
                return reject("volume must be positive");
            }
            if !optional_positive(stop_loss_pips) {
                return reject("stop-loss distance must be positive");
            }
            if !optional_positive(take_profit_pips) {
                return reject("take-profit distance must be positive");
            }
            Ok(())
        }
        Action::ModifyVolume {
            position_id,
            volume,
            ..
        } => {
            if position_id <= 0 {
                return reject("position id must be positive");
            }
            if !is_positive(volume) {
                return reject("volume must be positive");
            }
            Ok(())
        }
        Action::ModifyStopLoss {
            position_id, price, ..
        }
        | Action::ModifyTakeProfit {
            position_id, price, ..
        } => {
            if position_id <= 0 {
                return reject("position id must be positive");
            }
            if !optional_positive(price) {
                return reject("price must be positive");
            }
            Ok(())
        }
        Action::Close { position_id, .. } => {
            if position_id <= 0 {
                return reject("position id must be positive");
            }
            Ok(())
        }
        // thresholds are stored as given; an unreachable one never fires
        Action::SetTarget(..) => Ok(()),
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn optional_positive(value: Option<f64>) -> bool {
    value.map_or(true, is_positive)
}
