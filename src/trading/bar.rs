//! The single live bar of a session.

use crate::protocol::{BarSnapshot, TickSnapshot};

/// A price update with the conversion rates in force at that instant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tick {
    pub time_ms: i64,
    pub ask: f64,
    pub bid: f64,
    pub base_to_account: f64,
    pub account_to_base: f64,
    pub quote_to_account: f64,
    pub account_to_quote: f64,
}

impl Tick {
    pub fn snapshot(&self) -> TickSnapshot {
        TickSnapshot {
            time_ms: self.time_ms,
            ask: self.ask,
            bid: self.bid,
        }
    }
}

/// Bar built incrementally from ticks. Prices are bid based.
///
/// `gap` is the close of the previous bar; it equals `open` only for the
/// first bar of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    open_time_ms: i64,
    gap: Tick,
    open: Tick,
    high: Tick,
    low: Tick,
    close: Tick,
    tick_volume: f64,
    /// Rolled but no tick seen yet.
    awaiting_open: bool,
}

impl Bar {
    /// Starts the first bar of a session at `open_time_ms` with `first` as
    /// its opening tick.
    pub fn new(open_time_ms: i64, first: Tick) -> Self {
        Self {
            open_time_ms,
            gap: first,
            open: first,
            high: first,
            low: first,
            close: first,
            tick_volume: 1.0,
            awaiting_open: false,
        }
    }

    pub fn on_tick(&mut self, tick: Tick) {
        if self.awaiting_open {
            self.open = tick;
            self.high = tick;
            self.low = tick;
            self.close = tick;
            self.tick_volume = 1.0;
            self.awaiting_open = false;
            return;
        }
        if tick.bid > self.high.bid {
            self.high = tick;
        }
        if tick.bid < self.low.bid {
            self.low = tick;
        }
        self.close = tick;
        self.tick_volume += 1.0;
    }

    /// Moves to the next bar: the previous close becomes the gap tick and
    /// the next tick opens the bar.
    pub fn roll(&mut self, open_time_ms: i64) {
        self.open_time_ms = open_time_ms;
        self.gap = self.close;
        self.open = self.close;
        self.high = self.close;
        self.low = self.close;
        self.tick_volume = 0.0;
        self.awaiting_open = true;
    }

    pub fn snapshot(&self) -> BarSnapshot {
        BarSnapshot {
            open_time_ms: self.open_time_ms,
            open: self.open.bid,
            high: self.high.bid,
            low: self.low.bid,
            close: self.close.bid,
            tick_volume: self.tick_volume,
        }
    }

    pub fn open_time_ms(&self) -> i64 {
        self.open_time_ms
    }

    pub fn gap(&self) -> &Tick {
        &self.gap
    }

    pub fn open(&self) -> &Tick {
        &self.open
    }

    pub fn high(&self) -> &Tick {
        &self.high
    }

    pub fn low(&self) -> &Tick {
        &self.low
    }

    pub fn close(&self) -> &Tick {
        &self.close
    }

    pub fn tick_volume(&self) -> f64 {
        self.tick_volume
    }
}
