//! External boundaries of the link layer
//!
//! Scanning, pairing, characteristic discovery, and raw packet I/O belong to
//! the embedding application; a [`Session`](super::Session) only sees them
//! through the [`Transport`] trait. Likewise, answering a die's NotifyUser
//! request is delegated to a caller-supplied [`UserPrompt`].

use std::time::Duration;

use crate::core::Result;

/// One notification-based packet channel to a die
///
/// Implementations deliver at most one queued notification per
/// `poll_notification` call and report transport faults through [`Result`].
/// A session owns its transport exclusively; the trait is not designed for
/// sharing a channel between sessions.
pub trait Transport {
    /// Writes one raw packet to the die
    fn write(&mut self, packet: &[u8]) -> Result<()>;

    /// Blocks up to `timeout` for the next notification
    ///
    /// Returns the raw packet if one was delivered, or None if the wait
    /// elapsed quietly. Must respect the timeout so callers can poll several
    /// sessions round-robin with short budgets.
    fn poll_notification(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>>;

    /// Tears the underlying connection down
    fn disconnect(&mut self);
}

/// Collaborator that answers a NotifyUser request with a continue/abort choice
pub trait UserPrompt {
    /// Asks the user to confirm; returns true to continue
    ///
    /// `can_abort` is false when the die's message flags do not offer a
    /// cancel choice, in which case the session forces a continue reply no
    /// matter what this returns.
    fn confirm(&mut self, text: &str, timeout_secs: u8, can_abort: bool) -> bool;
}

/// Prompt for headless use: always elects to continue
pub struct AcceptAll;

impl UserPrompt for AcceptAll {
    fn confirm(&mut self, _text: &str, _timeout_secs: u8, _can_abort: bool) -> bool {
        true
    }
}
