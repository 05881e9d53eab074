//! Errors raised while sending events.

use std::fmt::Debug;
use thiserror::Error;

/// Errors from the state store's event queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The single queue slot was occupied and the caller asked not to wait.
    #[error("Event rejected: the store queue slot is occupied")]
    Rejected,

    /// The fold loop is gone, so nothing will consume the event.
    #[error("State store is closed")]
    Closed,
}

/// Errors that can occur when sending an event to a state machine.
///
/// `InvalidTransition` and `GuardFailed` are detected before anything is
/// published, so neither leaves the machine partially updated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError<V: Debug, E: Debug> {
    /// No edge out of `state` selects the event's tag.
    #[error("No transition from phase {state:?} accepts event {event:?}")]
    InvalidTransition { state: V, event: E },

    /// An edge exists, but its guard rejected the payload/event pair.
    #[error("Guard rejected event {event:?} in phase {state:?}")]
    GuardFailed { state: V, event: E },

    /// Forwarding the accepted event to the store failed.
    #[error("State store unavailable: {0}")]
    Store(#[from] StoreError),
}

impl<V: Debug, E: Debug> TransitionError<V, E> {
    /// Validation failures are recoverable; a closed store is not.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, TransitionError::Store(_))
    }
}
