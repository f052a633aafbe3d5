use std::time::Duration;
use thiserror::Error;

use crate::core::types::MessageKind;

/// Custom error types for the Pixels link
#[derive(Error, Debug)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unknown message kind byte 0x{byte:02x}")]
    UnknownMessageKind {
        /// The unmapped first byte of the offending packet
        byte: u8,
    },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Identification error: {0}")]
    Identification(String),

    #[error("Acknowledgement {ack:?} not received within {timeout:?}")]
    AckTimeout {
        /// The acknowledgement kind that was expected
        ack: MessageKind,
        /// The deadline that elapsed
        timeout: Duration,
    },

    #[error("Precondition violated: {0}")]
    Precondition(String),
}

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Error::Transport(msg.into())
    }

    /// Creates a new protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Error::Protocol(msg.into())
    }

    /// Creates a new identification error
    pub fn identification(msg: impl Into<String>) -> Self {
        Error::Identification(msg.into())
    }

    /// Creates a new precondition error
    pub fn precondition(msg: impl Into<String>) -> Self {
        Error::Precondition(msg.into())
    }
}
