//! Tagged events and the selectors that match them.
//!
//! Transition edges never inspect an event's concrete value to decide
//! whether they apply; they only look at its tag.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// An event that can drive both a transition and the payload reducer.
///
/// Every variant maps to an explicit tag. Edge selection matches on the
/// tag only.
///
/// # Example
///
/// ```rust
/// use turnstate::core::Event;
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// enum MoveKind {
///     Draw,
///     Pass,
/// }
///
/// #[derive(Clone, Debug)]
/// enum Move {
///     Draw { origin: u8 },
///     Pass { origin: u8 },
/// }
///
/// impl Event for Move {
///     type Tag = MoveKind;
///
///     fn tag(&self) -> MoveKind {
///         match self {
///             Self::Draw { .. } => MoveKind::Draw,
///             Self::Pass { .. } => MoveKind::Pass,
///         }
///     }
/// }
///
/// assert_eq!(Move::Pass { origin: 1 }.tag(), MoveKind::Pass);
/// ```
pub trait Event: Clone + Debug + Send + Sync + 'static {
    /// Discriminant type naming each event variant.
    type Tag: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    /// The tag of this event's variant.
    fn tag(&self) -> Self::Tag;
}

/// Identifies which event variants satisfy a transition edge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selector<K> {
    /// Exactly one variant.
    Tag(K),
    /// Any of the listed variants.
    AnyOf(Vec<K>),
}

impl<K: Copy + Eq> Selector<K> {
    /// Select a single tag.
    pub fn tag(tag: K) -> Self {
        Selector::Tag(tag)
    }

    /// Select any of the given tags.
    pub fn any_of(tags: impl IntoIterator<Item = K>) -> Self {
        Selector::AnyOf(tags.into_iter().collect())
    }

    /// Whether the given tag satisfies this selector.
    pub fn matches(&self, tag: &K) -> bool {
        match self {
            Selector::Tag(expected) => expected == tag,
            Selector::AnyOf(expected) => expected.contains(tag),
        }
    }
}

impl<K> From<K> for Selector<K> {
    fn from(tag: K) -> Self {
        Selector::Tag(tag)
    }
}
