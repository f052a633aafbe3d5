//! Core types for the Pixels link protocol
//!
//! This module contains the fundamental building blocks used throughout the library.

pub mod error;
pub mod serde;
pub mod types;

pub use self::error::{Error, Result};
pub use self::types::{
    AnimationSet,
    DeviceKind,
    LinkConfig,
    Message,
    MessageKind,
};

/// Maximum wire packet size in bytes (Bluetooth 4.x notification payload)
pub const MAX_PACKET_SIZE: usize = 20;

/// Payload bytes carried by one BulkData chunk; the rest of the packet is
/// the kind byte plus the `[size:1][offset:2]` chunk header
pub const BULK_CHUNK_SIZE: usize = 16;

/// Largest payload the bulk sub-protocol can address (u16 offset field)
pub const MAX_BULK_PAYLOAD: usize = u16::MAX as usize;
