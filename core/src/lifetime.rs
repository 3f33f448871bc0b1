//! View Lifetimes
//!
//! A surface owns one [`Lifetime`]. Every request it issues carries a
//! [`Ticket`] minted from that lifetime, and the completion comes back with
//! the same ticket. Once the surface unmounts (or remounts) the old tickets
//! stop being accepted, so late completions fall on the floor instead of
//! mutating a view that is no longer there.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lifetime ids are process-unique so tickets from two surfaces never collide
static NEXT_LIFETIME_ID: AtomicU64 = AtomicU64::new(1);

/// Ties a request to the lifetime that issued it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ticket {
    lifetime: u64,
    seq: u64,
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.lifetime, self.seq)
    }
}

/// The active period of a mounted view
#[derive(Debug)]
pub struct Lifetime {
    id: u64,
    active: bool,
    next_seq: u64,
}

impl Lifetime {
    /// A lifetime that has not started; it accepts nothing
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: 0,
            active: false,
            next_seq: 0,
        }
    }

    /// Start a fresh lifetime, invalidating every earlier ticket
    pub fn begin(&mut self) {
        self.id = NEXT_LIFETIME_ID.fetch_add(1, Ordering::Relaxed);
        self.active = true;
        self.next_seq = 0;
    }

    /// End the lifetime; outstanding tickets are no longer accepted
    pub fn end(&mut self) {
        self.active = false;
    }

    /// Whether the lifetime is running
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Mint a ticket for a new request
    pub fn ticket(&mut self) -> Ticket {
        self.next_seq += 1;
        Ticket {
            lifetime: self.id,
            seq: self.next_seq,
        }
    }

    /// Whether a completion carrying `ticket` may touch view state
    #[must_use]
    pub fn accepts(&self, ticket: &Ticket) -> bool {
        self.active && ticket.lifetime == self.id
    }
}

impl Default for Lifetime {
    fn default() -> Self {
        Self::new()
    }
}
