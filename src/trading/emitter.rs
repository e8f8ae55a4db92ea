//! Turns host events into Update bursts and waits out each reply.
//!
//! Every host callback becomes one blocking round:
//!
//! ```text
//! host event ──► Update(s) ──► Complete ──► ActionDispatcher::run_burst ──► return
//! ```
//!
//! The callback does not return until the decision process has answered, so
//! the host cannot deliver the next event mid-round. This is the only flow
//! control between the two processes.

use std::path::Path;

use log::{debug, error, info, warn};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::ipc::{Channel, EndpointIdentity};
use crate::protocol::{
    AccountBalance, AccountInfo, ClosedEvent, Position, PositionEvent, RuntimeInfo, SymbolInfo,
    Trade, Update, VolumeEvent, WireWriter,
};
use crate::trading::bar::{Bar, Tick};
use crate::trading::dispatcher::ActionDispatcher;
use crate::trading::host::TradingHost;
use crate::trading::shadow::{PositionChange, ShadowBook};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Channel connected, initial snapshots not sent yet.
    Connected,
    Running,
    /// Shut down or failed; no further events are accepted.
    Stopped,
}

/// Owns the channel, the live bar and the shadow book for one session.
pub struct UpdateEmitter<H: TradingHost> {
    channel: Channel,
    host: H,
    bar: Bar,
    shadow: ShadowBook,
    dispatcher: ActionDispatcher,
    state: SessionState,
}

impl<H: TradingHost> UpdateEmitter<H> {
    /// Wraps an already connected channel.
    pub fn new(channel: Channel, host: H, bar: Bar) -> Self {
        Self {
            channel,
            host,
            bar,
            shadow: ShadowBook::new(),
            dispatcher: ActionDispatcher::new(),
            state: SessionState::Connected,
        }
    }

    /// Creates the channel for `identity` and waits for the decision
    /// process to connect.
    pub fn listen(
        config: &BridgeConfig,
        identity: &EndpointIdentity,
        host: H,
        bar: Bar,
    ) -> Result<Self> {
        let mut channel = Channel::listen(Path::new(&config.socket_dir), identity)?;
        match config.accept_timeout() {
            Some(timeout) => channel.accept_timeout(timeout)?,
            None => channel.accept()?,
        }
        Ok(Self::new(channel, host, bar))
    }

    /// Sends the runtime, account and symbol snapshots, one round each.
    pub fn start(
        &mut self,
        runtime: RuntimeInfo,
        account: AccountInfo,
        symbol: SymbolInfo,
    ) -> Result<()> {
        match self.state {
            SessionState::Connected => {}
            SessionState::Running => {
                warn!("session {} already started", self.channel.name());
                return Ok(());
            }
            SessionState::Stopped => return Err(BridgeError::SessionStopped),
        }
        info!(
            "starting session {} ({:?}, {:?})",
            self.channel.name(),
            runtime.run_mode,
            runtime.tick_accuracy
        );
        self.round(&[Update::Runtime(runtime)])?;
        self.round(&[Update::Account(account)])?;
        self.round(&[Update::Symbol(symbol)])?;
        self.state = SessionState::Running;
        Ok(())
    }

    pub fn on_position_opened(&mut self, position: &Position, account: AccountBalance) -> Result<()> {
        self.ensure_running()?;
        self.shadow.on_opened(position);
        let event = PositionEvent {
            bar: self.bar.snapshot(),
            account,
            position: *position,
        };
        self.round(&[Update::Opened(position.side, event)])?;
        Ok(())
    }

    /// Reports the first changed attribute of `position`.
    ///
    /// `trade` is the deal behind a volume change, when the host has one.
    /// Nothing is sent if no tracked attribute changed.
    pub fn on_position_modified(
        &mut self,
        position: &Position,
        account: AccountBalance,
        trade: Option<&Trade>,
    ) -> Result<()> {
        self.ensure_running()?;
        let Some(change) = self.shadow.on_modified(position) else {
            debug!("position {} modified without a tracked change", position.id);
            return Ok(());
        };
        let bar = self.bar.snapshot();
        let side = position.side;
        let update = match change {
            PositionChange::Volume => {
                let trade = match trade {
                    Some(trade) => *trade,
                    None => {
                        warn!("volume change on position {} without a deal", position.id);
                        Trade::without_deal(position, self.bar.close().time_ms)
                    }
                };
                Update::ModifiedVolume(
                    side,
                    VolumeEvent {
                        bar,
                        account,
                        position: *position,
                        trade,
                    },
                )
            }
            PositionChange::StopLoss => Update::ModifiedStopLoss(
                side,
                PositionEvent {
                    bar,
                    account,
                    position: *position,
                },
            ),
            PositionChange::TakeProfit => Update::ModifiedTakeProfit(
                side,
                PositionEvent {
                    bar,
                    account,
                    position: *position,
                },
            ),
        };
        self.round(&[update])?;
        Ok(())
    }

    pub fn on_position_closed(&mut self, trade: &Trade, account: AccountBalance) -> Result<()> {
        self.ensure_running()?;
        self.shadow.on_closed(trade.position_id);
        let event = ClosedEvent {
            bar: self.bar.snapshot(),
            account,
            trade: *trade,
        };
        self.round(&[Update::Closed(trade.side, event)])?;
        Ok(())
    }

    /// Folds the tick into the bar, then reports crossed targets or, if
    /// none fired, the tick itself.
    pub fn on_tick(&mut self, tick: Tick) -> Result<()> {
        self.ensure_running()?;
        self.bar.on_tick(tick);
        let snapshot = tick.snapshot();
        let crossed = self
            .dispatcher
            .targets_mut()
            .take_crossed(tick.ask, tick.bid);
        if crossed.is_empty() {
            self.round(&[Update::TickClosed(snapshot)])?;
            return Ok(());
        }
        let updates: Vec<Update> = crossed
            .into_iter()
            .map(|target| Update::TargetReached(target, snapshot))
            .collect();
        self.round(&updates)?;
        Ok(())
    }

    /// Reports the finished bar, then rolls it to `next_open_time_ms`.
    pub fn on_bar_closed(&mut self, next_open_time_ms: i64) -> Result<()> {
        self.ensure_running()?;
        let snapshot = self.bar.snapshot();
        self.round(&[Update::BarClosed(snapshot)])?;
        self.bar.roll(next_open_time_ms);
        Ok(())
    }

    /// Sends `Shutdown`, waits for the final reply and closes the channel.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.state == SessionState::Stopped {
            return Err(BridgeError::SessionStopped);
        }
        info!("shutting down session {}", self.channel.name());
        let applied = self.round(&[Update::Shutdown]);
        self.state = SessionState::Stopped;
        self.channel.close();
        if let Ok(n) = applied {
            if n > 0 {
                warn!("{} action(s) applied in reply to shutdown", n);
            }
        }
        applied.map(|_| ())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn bar(&self) -> &Bar {
        &self.bar
    }

    pub fn shadow(&self) -> &ShadowBook {
        &self.shadow
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Closes the channel and hands the host back.
    pub fn into_host(mut self) -> H {
        self.channel.close();
        self.host
    }

    fn ensure_running(&self) -> Result<()> {
        match self.state {
            SessionState::Running => Ok(()),
            SessionState::Connected => Err(BridgeError::NotStarted),
            SessionState::Stopped => Err(BridgeError::SessionStopped),
        }
    }

    /// One turn: the burst, its `Complete`, then the Action burst in reply.
    fn round(&mut self, updates: &[Update]) -> Result<usize> {
        match self.exchange(updates) {
            Ok(applied) => Ok(applied),
            Err(err) => {
                self.terminate(&err);
                Err(err)
            }
        }
    }

    fn exchange(&mut self, updates: &[Update]) -> Result<usize> {
        for update in updates {
            self.send(update)?;
        }
        self.send(&Update::Complete)?;
        debug!("sent burst of {} update(s)", updates.len());
        self.dispatcher.run_burst(&mut self.channel, &mut self.host)
    }

    fn send(&mut self, update: &Update) -> Result<()> {
        // one write per message
        let mut w = WireWriter::with_capacity(update.wire_len());
        update.encode_into(&mut w);
        self.channel.send(&w.into_bytes())?;
        Ok(())
    }

    fn terminate(&mut self, err: &BridgeError) {
        if self.state == SessionState::Stopped {
            return;
        }
        error!("session {} terminated: {}", self.channel.name(), err);
        self.state = SessionState::Stopped;
        self.host.stop(err);
        self.channel.close();
    }
}
