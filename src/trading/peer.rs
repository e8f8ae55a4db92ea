//! Decision-process side of the bridge.
//!
//! The mirror image of the emitter: read an Update burst up to `Complete`,
//! decide, answer with an Action burst terminated by `Complete`.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use tradebridge::ipc::EndpointIdentity;
//! use tradebridge::protocol::{Action, Update};
//! use tradebridge::trading::DecisionPeer;
//!
//! let identity = EndpointIdentity::new("broker", "EURUSD", "m1", "1")?;
//! let mut peer = DecisionPeer::connect(Path::new("/tmp/tradebridge"), &identity)?;
//! peer.serve(|updates: &[Update]| -> Vec<Action> {
//!     println!("{} update(s)", updates.len());
//!     Vec::new()
//! })?;
//! # Ok::<(), tradebridge::error::BridgeError>(())
//! ```

use std::path::Path;

use log::{debug, info};

use crate::error::{ProtocolError, Result};
use crate::ipc::{Channel, EndpointIdentity};
use crate::protocol::{Action, ActionKind, Direction, Update, UpdateKind, WireWriter};

/// Strategy logic driven by a [`DecisionPeer`].
pub trait Decider {
    /// Returns the Actions answering one Update burst. The terminating
    /// `Complete` is appended by the peer.
    fn decide(&mut self, updates: &[Update]) -> Vec<Action>;
}

impl<F> Decider for F
where
    F: FnMut(&[Update]) -> Vec<Action>,
{
    fn decide(&mut self, updates: &[Update]) -> Vec<Action> {
        self(updates)
    }
}

/// Counters returned by [`DecisionPeer::serve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeerStats {
    pub bursts: u64,
    pub updates: u64,
    pub actions: u64,
}

pub struct DecisionPeer {
    channel: Channel,
    payload: Vec<u8>,
    stats: PeerStats,
}

impl DecisionPeer {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            payload: Vec::new(),
            stats: PeerStats::default(),
        }
    }

    /// Connects to the trading process endpoint for `identity`.
    pub fn connect(dir: &Path, identity: &EndpointIdentity) -> Result<Self> {
        let channel = Channel::connect(dir, identity)?;
        info!("decision peer connected to {}", identity);
        Ok(Self::new(channel))
    }

    /// Reads Updates until `Complete`. The marker is not included.
    pub fn next_burst(&mut self) -> Result<Vec<Update>> {
        let mut burst = Vec::new();
        loop {
            let opcode = self.channel.recv_u8()?;
            let kind = UpdateKind::from_u8(opcode).ok_or(ProtocolError::UnknownOpcode {
                direction: Direction::Update,
                opcode,
            })?;
            self.payload.resize(kind.payload_size(), 0);
            self.channel.recv_into(&mut self.payload)?;
            let update = Update::decode(opcode, &self.payload)?;
            if update == Update::Complete {
                break;
            }
            burst.push(update);
        }
        self.stats.bursts += 1;
        self.stats.updates += burst.len() as u64;
        Ok(burst)
    }

    /// Sends `actions` then `Complete`. Stray `Complete` entries in
    /// `actions` are skipped so they cannot end the burst early.
    pub fn reply(&mut self, actions: &[Action]) -> Result<()> {
        let mut sent = 0u64;
        for action in actions.iter().filter(|a| **a != Action::Complete) {
            let mut w = WireWriter::with_capacity(action.wire_len());
            action.encode_into(&mut w);
            self.channel.send(&w.into_bytes())?;
            sent += 1;
        }
        self.channel.send(&[ActionKind::Complete.as_u8()])?;
        self.stats.actions += sent;
        Ok(())
    }

    /// Answers bursts with `decider` until the burst carrying `Shutdown`
    /// has been answered.
    pub fn serve<D: Decider>(&mut self, mut decider: D) -> Result<PeerStats> {
        loop {
            let burst = self.next_burst()?;
            let actions = decider.decide(&burst);
            debug!(
                "burst of {} update(s) answered with {} action(s)",
                burst.len(),
                actions.len()
            );
            self.reply(&actions)?;
            if burst.iter().any(|u| *u == Update::Shutdown) {
                info!("session {} shut down", self.channel.name());
                self.channel.close();
                return Ok(self.stats);
            }
        }
    }

    pub fn stats(&self) -> PeerStats {
        self.stats
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }
}
