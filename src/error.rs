use std::fmt;

use crate::protocol::Direction;

/// Codec and framing failures. Both indicate a bug or a version mismatch
/// between the peers and are never recovered locally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("unknown {direction} opcode {opcode}")]
    UnknownOpcode { direction: Direction, opcode: u8 },
    #[error("truncated payload for opcode {opcode}: need {needed} bytes, have {available}")]
    Truncated {
        opcode: u8,
        needed: usize,
        available: usize,
    },
    #[error("invalid {field} discriminant {value}")]
    InvalidDiscriminant { field: &'static str, value: u8 },
}

/// An endpoint identity component that cannot name a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    EmptyComponent { field: &'static str },
    InvalidComponent { field: &'static str, value: String },
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityError::EmptyComponent { field } => {
                write!(f, "empty identity component: {field}")
            }
            IdentityError::InvalidComponent { field, value } => {
                write!(f, "invalid identity component for {field}: {value}")
            }
        }
    }
}

impl std::error::Error for IdentityError {}

/// Transport failures. `Disconnected` is fatal; the bridge never reconnects.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("peer disconnected")]
    Disconnected,
    #[error("a peer is already connected")]
    AlreadyConnected,
    #[error("endpoint {} is held by a live session", .0.display())]
    AlreadyListening(std::path::PathBuf),
    #[error("no peer connected within {0:?}")]
    AcceptTimeout(std::time::Duration),
    #[error("channel closed")]
    Closed,
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error("io error: {0}")]
    Io(#[source] std::io::Error),
}

impl From<std::io::Error> for ChannelError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::UnexpectedEof => ChannelError::Disconnected,
            _ => ChannelError::Io(err),
        }
    }
}

/// Failure reported by the host for an order operation.
pub type HostError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Order operation names used in execution errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderOperation {
    Open,
    ModifyVolume,
    ModifyStopLoss,
    ModifyTakeProfit,
    Close,
}

impl fmt::Display for OrderOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderOperation::Open => "open",
            OrderOperation::ModifyVolume => "modify volume",
            OrderOperation::ModifyStopLoss => "modify stop-loss",
            OrderOperation::ModifyTakeProfit => "modify take-profit",
            OrderOperation::Close => "close",
        };
        f.write_str(name)
    }
}

/// An order operation the host refused or failed to carry out.
#[derive(Debug, thiserror::Error)]
#[error("{operation} failed{}: {source}", position_suffix(.position_id))]
pub struct ExecutionError {
    pub operation: OrderOperation,
    pub position_id: Option<i32>,
    #[source]
    pub source: HostError,
}

fn position_suffix(position_id: &Option<i32>) -> String {
    match position_id {
        Some(id) => format!(" for position {id}"),
        None => String::new(),
    }
}

/// Session-level error. Every variant terminates the trading session.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error("rejected action {opcode}: {reason}")]
    InvalidAction { opcode: u8, reason: &'static str },
    #[error("trading session not started")]
    NotStarted,
    #[error("trading session already stopped")]
    SessionStopped,
    #[error("config error: {0}")]
    Config(String),
}

impl From<IdentityError> for BridgeError {
    fn from(err: IdentityError) -> Self {
        BridgeError::Channel(ChannelError::Identity(err))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_disconnects_are_classified() {
        let err: ChannelError = std::io::Error::from(std::io::ErrorKind::BrokenPipe).into();
        assert!(matches!(err, ChannelError::Disconnected));
        let err: ChannelError = std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into();
        assert!(matches!(err, ChannelError::Disconnected));
        let err: ChannelError = std::io::Error::from(std::io::ErrorKind::PermissionDenied).into();
        assert!(matches!(err, ChannelError::Io(_)));
    }

    #[test]
    fn execution_error_message() {
        let err = ExecutionError {
            operation: OrderOperation::Close,
            position_id: Some(42),
            source: "market closed".into(),
        };
        assert_eq!(err.to_string(), "close failed for position 42: market closed");

        let err = ExecutionError {
            operation: OrderOperation::Open,
            position_id: None,
            source: "not enough money".into(),
        };
        assert_eq!(err.to_string(), "open failed: not enough money");
    }
}
