//! Price thresholds armed by the decision process.

use crate::protocol::Target;

/// Four optional one-shot thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WatchTargets {
    ask_above: Option<f64>,
    ask_below: Option<f64>,
    bid_above: Option<f64>,
    bid_below: Option<f64>,
}

impl WatchTargets {
    pub fn get(&self, target: Target) -> Option<f64> {
        *self.slot(target)
    }

    /// Replaces a threshold; `None` disarms it.
    pub fn set(&mut self, target: Target, price: Option<f64>) {
        *self.slot_mut(target) = price;
    }

    pub fn is_armed(&self) -> bool {
        Target::ALL.iter().any(|t| self.get(*t).is_some())
    }

    /// Returns the thresholds crossed by `ask`/`bid` in the order ask-above,
    /// ask-below, bid-above, bid-below, disarming each one that fired.
    pub fn take_crossed(&mut self, ask: f64, bid: f64) -> Vec<Target> {
        let mut crossed = Vec::new();
        for target in Target::ALL {
            let Some(level) = self.get(target) else {
                continue;
            };
            let hit = match target {
                Target::AskAbove => ask >= level,
                Target::AskBelow => ask <= level,
                Target::BidAbove => bid >= level,
                Target::BidBelow => bid <= level,
            };
            if hit {
                self.set(target, None);
                crossed.push(target);
            }
        }
        crossed
    }

    fn slot(&self, target: Target) -> &Option<f64> {
        match target {
            Target::AskAbove => &self.ask_above,
            Target::AskBelow => &self.ask_below,
            Target::BidAbove => &self.bid_above,
            Target::BidBelow => &self.bid_below,
        }
    }

    fn slot_mut(&mut self, target: Target) -> &mut Option<f64> {
        match target {
            Target::AskAbove => &mut self.ask_above,
            Target::AskBelow => &mut self.ask_below,
            Target::BidAbove => &mut self.bid_above,
            Target::BidBelow => &mut self.bid_below,
        }
    }
}
