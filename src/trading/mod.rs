//! Bridge domain layer.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  trading/                                                    │
//! │  - UpdateEmitter   host events ──► Update bursts             │
//! │  - ActionDispatcher  Action bursts ──► TradingHost           │
//! │  - Bar, ShadowBook, WatchTargets (session state)             │
//! │  - DecisionPeer    the other end, for Rust decision code     │
//! ├──────────────────────────────────────────────────────────────┤
//! │  protocol/  (wire codec)          ipc/  (socket channel)     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A session runs on one thread. Each host callback on the emitter is a
//! full turn: it returns only after the decision process has answered and
//! every Action in the answer has been applied.
//!
//! # Example
//!
//! ```no_run
//! use tradebridge::config::BridgeConfig;
//! use tradebridge::ipc::EndpointIdentity;
//! use tradebridge::trading::{Bar, Tick, TradingHost, UpdateEmitter};
//!
//! fn run<H: TradingHost>(host: H, first: Tick) -> tradebridge::error::Result<()> {
//!     let identity = EndpointIdentity::new("broker", "EURUSD", "m1", "1")?;
//!     let mut emitter =
//!         UpdateEmitter::listen(&BridgeConfig::default(), &identity, host, Bar::new(0, first))?;
//!     // emitter.start(..), then forward host callbacks
//!     emitter.shutdown()
//! }
//! ```

pub mod bar;
pub mod dispatcher;
pub mod emitter;
pub mod host;
pub mod peer;
pub mod shadow;
pub mod targets;

pub use bar::{Bar, Tick};
pub use dispatcher::ActionDispatcher;
pub use emitter::{SessionState, UpdateEmitter};
pub use host::TradingHost;
pub use peer::{DecisionPeer, Decider, PeerStats};
pub use shadow::{PositionChange, ShadowBook, ShadowPosition};
pub use targets::WatchTargets;
