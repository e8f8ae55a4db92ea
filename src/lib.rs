//! Synchronous binary bridge between a trading platform and an external
//! decision process.
//!
//! The trading side owns a named Unix socket per session and, for every
//! platform event, sends a burst of Update messages and blocks until the
//! decision process answers with a burst of Actions.

pub mod config;
pub mod error;
pub mod ipc;
pub mod protocol;
pub mod trading;

pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use ipc::{Channel, EndpointIdentity};
pub use protocol::{Action, Update};
pub use trading::{DecisionPeer, TradingHost, UpdateEmitter};
