//! Channel transport between the trading session and the decision process.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  trading/ (emitter, dispatcher, peer)                    │
//! ├──────────────────────────────────────────────────────────┤
//! │  ipc/ (named single-client duplex channel) ← YOU ARE HERE│
//! ├──────────────────────────────────────────────────────────┤
//! │  Unix domain socket                                      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use tradebridge::ipc::{Channel, EndpointIdentity};
//!
//! let identity = EndpointIdentity::new("Broker", "EURUSD", "Minute5", "1")?;
//!
//! // Trading process
//! let mut channel = Channel::listen(Path::new("/tmp/tradebridge"), &identity)?;
//! channel.accept()?;
//! channel.send(&[0])?;
//!
//! // Decision process
//! let mut peer = Channel::connect(Path::new("/tmp/tradebridge"), &identity)?;
//! let opcode = peer.recv_u8()?;
//! # let _ = opcode;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod channel;
pub mod endpoint;

pub use channel::{Channel, ChannelCloser};
pub use endpoint::{validate_component, EndpointIdentity};
