//! Last-known attributes of the positions opened by this session.
//!
//! The host raises one generic "modified" event; the only way to tell which
//! attribute moved is to compare against the previous values kept here.

use std::collections::HashMap;

use log::warn;

use crate::protocol::Position;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowPosition {
    pub volume: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl From<&Position> for ShadowPosition {
    fn from(position: &Position) -> Self {
        Self {
            volume: position.volume,
            stop_loss: position.stop_loss,
            take_profit: position.take_profit,
        }
    }
}

/// The attribute reported for a modify event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionChange {
    Volume,
    StopLoss,
    TakeProfit,
}

/// Shadow records keyed by broker position id.
#[derive(Debug, Default)]
pub struct ShadowBook {
    positions: HashMap<i32, ShadowPosition>,
}

impl ShadowBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_opened(&mut self, position: &Position) {
        if self
            .positions
            .insert(position.id, ShadowPosition::from(position))
            .is_some()
        {
            warn!("position {} opened twice; shadow record replaced", position.id);
        }
    }

    /// Records the new attributes and returns the first one that changed,
    /// checked in the order volume, stop-loss, take-profit.
    ///
    /// Only one change is reported per event even if several attributes
    /// moved at once; the record is still brought fully up to date.
    pub fn on_modified(&mut self, position: &Position) -> Option<PositionChange> {
        let current = ShadowPosition::from(position);
        let previous = match self.positions.insert(position.id, current) {
            Some(previous) => previous,
            None => {
                warn!("modify for untracked position {}; now tracking", position.id);
                return None;
            }
        };
        if previous.volume != current.volume {
            Some(PositionChange::Volume)
        } else if previous.stop_loss != current.stop_loss {
            Some(PositionChange::StopLoss)
        } else if previous.take_profit != current.take_profit {
            Some(PositionChange::TakeProfit)
        } else {
            None
        }
    }

    pub fn on_closed(&mut self, position_id: i32) -> Option<ShadowPosition> {
        let removed = self.positions.remove(&position_id);
        if removed.is_none() {
            warn!("close for untracked position {}", position_id);
        }
        removed
    }

    pub fn get(&self, position_id: i32) -> Option<&ShadowPosition> {
        self.positions.get(&position_id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
