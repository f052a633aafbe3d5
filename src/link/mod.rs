//! Die link management module
//!
//! This module owns one established connection to a die: the transport and
//! prompt boundaries, the bulk-transfer chunking, and the session object that
//! drives the handshake, dispatch, and public operations.

mod bulk;
mod session;
mod transport;

pub use self::bulk::{BulkChunk, BulkChunks};
pub use self::session::Session;
pub use self::transport::{AcceptAll, Transport, UserPrompt};
