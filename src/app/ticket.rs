//! Request tickets.
//!
//! Responses to independent requests can arrive in any order. A workflow
//! takes a ticket before it awaits a response and drops the response if a
//! newer ticket has been issued in the meantime, or if the session it was
//! requested under has since been replaced or cleared.

use std::sync::atomic::{AtomicU64, Ordering};

/// Ticket identifying one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    generation: u64,
}

/// Per-workflow ticket counter.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    /// Create a counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket under session `generation`, superseding every earlier one.
    pub fn issue(&self, generation: u64) -> Ticket {
        Ticket {
            seq: self.latest.fetch_add(1, Ordering::SeqCst) + 1,
            generation,
        }
    }

    /// Whether `ticket` is still the newest and was issued under `generation`.
    pub fn is_current(&self, ticket: Ticket, generation: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.seq && ticket.generation == generation
    }
}
