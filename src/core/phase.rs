//! Coarse phase markers for state machines.
//!
//! A phase carries no payload. It only tells which part of a turn the
//! session is in; the content lives in the state store.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for coarse state machine phases.
///
/// Phases are opaque tokens compared by value. They key the transition
/// table, so they must be hashable.
///
/// # Example
///
/// ```rust
/// use turnstate::core::Phase;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Turn {
///     Draw,
///     Play,
///     Over,
/// }
///
/// impl Phase for Turn {
///     fn name(&self) -> &str {
///         match self {
///             Self::Draw => "Draw",
///             Self::Play => "Play",
///             Self::Over => "Over",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Over)
///     }
/// }
/// ```
pub trait Phase:
    Clone + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Get the phase's name for display/logging.
    fn name(&self) -> &str;

    /// Check if this is a terminal phase.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }
}
