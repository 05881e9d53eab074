use crate::game::TableTransitionError;
use crate::machine::TransitionError;
use thiserror::Error;

/// Errors raised while walking a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpretError {
    /// A step reached a side that cannot resolve it.
    #[error("Routing contract violated: {0}")]
    RoutingContractViolation(String),

    /// A delegated call came back with the wrong shape of result.
    #[error("Expected {expected} result, got {found}")]
    ResultTypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The authoritative machine refused the event behind a step.
    #[error("Rejected by the table: {0}")]
    Rejected(String),

    /// A local chooser had nothing to offer.
    #[error("No {0} available to choose")]
    NoChoice(&'static str),

    /// The other side answered with a failure.
    #[error("Remote failure: {0}")]
    Remote(String),

    #[error("Session channel disconnected")]
    Disconnected,

    #[error("Table state store is closed")]
    StoreClosed,
}

impl InterpretError {
    /// Wiring errors that must end the session instead of being answered.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            InterpretError::RoutingContractViolation(_)
                | InterpretError::ResultTypeMismatch { .. }
                | InterpretError::StoreClosed
        )
    }
}

impl From<TableTransitionError> for InterpretError {
    fn from(err: TableTransitionError) -> Self {
        match err {
            TransitionError::Store(_) => InterpretError::StoreClosed,
            rejected => InterpretError::Rejected(rejected.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameEvent, PlayerId, Turn};
    use crate::machine::StoreError;

    #[test]
    fn guard_failures_become_recoverable_rejections() {
        let err: InterpretError = TableTransitionError::GuardFailed {
            state: Turn::Draw,
            event: GameEvent::DrawCards { origin: PlayerId(2) },
        }
        .into();

        assert!(matches!(err, InterpretError::Rejected(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn closed_store_is_fatal() {
        let err: InterpretError = TableTransitionError::Store(StoreError::Closed).into();
        assert_eq!(err, InterpretError::StoreClosed);
        assert!(err.is_fatal());
    }

    #[test]
    fn messages_name_the_problem() {
        let err = InterpretError::ResultTypeMismatch {
            expected: "player",
            found: "cards",
        };
        assert_eq!(err.to_string(), "Expected player result, got cards");
        assert_eq!(
            InterpretError::NoChoice("bug report").to_string(),
            "No bug report available to choose"
        );
    }
}
