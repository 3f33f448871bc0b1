//! Operation State
//!
//! Every async operation a view starts moves through the same machine:
//!
//! ```text
//! Idle ──begin──▶ Pending ──settle──▶ Settled(Success | Failure)
//!   ▲                                        │
//!   └────────────────────────────────────────┘  next begin / reset
//! ```
//!
//! There is no Cancelled state. A settled operation is idle for every
//! purpose except remembering how it ended.

use std::fmt;

/// The operations a view can have in flight
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Ask a question
    Ask,
    /// Upload a document
    Upload,
    /// Delete a document
    Delete,
    /// Fetch document history
    History,
    /// Probe backend health
    Health,
}

impl OpKind {
    /// Name for logs
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ask => "ask",
            Self::Upload => "upload",
            Self::Delete => "delete",
            Self::History => "history",
            Self::Health => "health",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a settled operation ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Settlement {
    /// The backend call succeeded
    Success,
    /// Anything else
    Failure,
}

impl Settlement {
    /// Settlement for a result
    #[must_use]
    pub fn of<T, E>(result: &Result<T, E>) -> Self {
        if result.is_ok() {
            Self::Success
        } else {
            Self::Failure
        }
    }
}

/// Where one operation is in its lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpState {
    /// Nothing in flight
    #[default]
    Idle,
    /// Request in flight; the view shows a busy indicator
    Pending,
    /// Finished; behaves like [`OpState::Idle`]
    Settled(Settlement),
}

impl OpState {
    /// Move to pending. Returns `false` (and changes nothing) if already pending.
    pub fn begin(&mut self) -> bool {
        if self.is_pending() {
            return false;
        }
        *self = Self::Pending;
        true
    }

    /// Record how the operation ended
    pub fn settle(&mut self, settlement: Settlement) {
        *self = Self::Settled(settlement);
    }

    /// Return to idle from any state
    ///
    /// Used when the request that would have settled a pending operation
    /// can no longer report back (its view lifetime ended).
    pub fn reset(&mut self) {
        *self = Self::Idle;
    }

    /// Whether a request is in flight
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut state = OpState::default();
        assert_eq!(state, OpState::Idle);

        assert!(state.begin());
        assert!(state.is_pending());
        assert!(!state.begin(), "a pending op cannot begin again");

        state.settle(Settlement::Failure);
        assert!(!state.is_pending());
        assert_eq!(state, OpState::Settled(Settlement::Failure));

        assert!(state.begin(), "settled behaves like idle");
        state.settle(Settlement::Success);
        assert_eq!(state, OpState::Settled(Settlement::Success));
    }

    #[test]
    fn test_reset_clears_pending() {
        let mut state = OpState::default();
        assert!(state.begin());

        state.reset();
        assert_eq!(state, OpState::Idle);
        assert!(state.begin());
    }

    #[test]
    fn test_settlement_of_result() {
        assert_eq!(Settlement::of(&Ok::<(), ()>(())), Settlement::Success);
        assert_eq!(Settlement::of(&Err::<(), ()>(())), Settlement::Failure);
    }
}
