use crate::interpreter::InterpretError;
use thiserror::Error;

/// Reasons a router stops.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A delegated walk hit a fatal wiring error.
    #[error("Session ended by fatal error: {0}")]
    Interpret(#[from] InterpretError),

    /// A delegated walk panicked or was aborted.
    #[error("Delegated walk failed: {0}")]
    TaskFailed(String),
}
