//! Bridge wire codec.
//!
//! Every message is a one-byte opcode followed by a payload whose size is a
//! function of the opcode alone. There are no length prefixes, terminators
//! or variable-width fields; the receiver reads the opcode, looks up
//! [`UpdateKind::payload_size`] or [`ActionKind::payload_size`] and then
//! reads exactly that many bytes.
//!
//! ```text
//! ┌────────┬──────────────────────────────────────────┐
//! │ opcode │ payload (fixed size per opcode, LE)      │
//! │  1 B   │ 0..=N B                                  │
//! └────────┴──────────────────────────────────────────┘
//! ```
//!
//! The codec is pure. It never checks that a price is positive or that a
//! volume is sane; that is left to the dispatcher.

#![allow(clippy::upper_case_acronyms)]

/// Declares a one-byte wire enumeration with a checked `TryFrom<u8>`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident = $value:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant = $value),+
        }

        impl $name {
            #[inline]
            pub const fn as_u8(self) -> u8 {
                self as u8
            }
        }

        impl TryFrom<u8> for $name {
            type Error = $crate::error::ProtocolError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $(v if v == $name::$variant as u8 => Ok($name::$variant),)+
                    other => Err($crate::error::ProtocolError::InvalidDiscriminant {
                        field: $field,
                        value: other,
                    }),
                }
            }
        }
    };
}

pub mod action;
pub mod opcode;
pub mod types;
pub mod update;
pub mod wire;

pub use action::{Action, OpenRequest};
pub use opcode::{ActionKind, Direction, Target, UpdateKind};
pub use types::{
    AccountBalance, AccountInfo, AccountType, Asset, BarSnapshot, CommissionType,
    MarginCalculationType, Position, PositionType, RunMode, RuntimeInfo, SwapCalculationType,
    SymbolInfo, TickAccuracy, TickSnapshot, Trade, TradeSide, Weekday, WireRecord,
};
pub use update::{ClosedEvent, PositionEvent, Update, VolumeEvent};
pub use wire::{WireReader, WireWriter, ABSENT};

/// Revision of the message layouts in this module.
pub const PROTOCOL_VERSION: u16 = 1;

/// Size of the opcode prefix on every message.
pub const OPCODE_LEN: usize = 1;
