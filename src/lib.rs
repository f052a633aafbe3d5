//! Pixel Link: client-side protocol engine for Pixels smart dice
//!
//! This library implements the message protocol spoken over a die's
//! notification link: framing and dispatch of typed messages, synchronous
//! request/acknowledgement correlation with timeouts, the chunked bulk-data
//! sub-protocol used to push animation tables through the 20-byte MTU, and
//! event fan-out for face-up and battery state changes. Scanning, pairing,
//! and raw packet I/O stay with the embedding application behind the
//! [`Transport`] trait.

pub mod core;
pub mod link;
pub mod protocol;

// Re-export commonly used items
pub use crate::core::{
    AnimationSet, DeviceKind, Error, LinkConfig, Message, MessageKind, Result,
};
pub use crate::link::{AcceptAll, Session, Transport, UserPrompt};
pub use crate::protocol::{EventBus, ListenerId};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
