//! Protocol implementation module
//!
//! This module defines the wire encoding/decoding of Pixels messages, the
//! observer primitive used for event fan-out, and the transient listener that
//! correlates requests with their acknowledgements.

pub mod ack;
pub mod codec;
pub mod event;

pub use self::ack::AckWaiter;
pub use self::event::{EventBus, ListenerId};
