//! Phase transition history tracking.
//!
//! Every accepted transition is recorded as an immutable value. Recording
//! returns a new history and leaves the old one untouched.

use super::phase::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single accepted phase transition.
///
/// `K` is the tag of the event that fired the edge.
///
/// # Example
///
/// ```rust
/// use turnstate::core::{Phase, PhaseTransition};
/// use serde::{Deserialize, Serialize};
/// use chrono::Utc;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Turn {
///     Draw,
///     Play,
/// }
///
/// impl Phase for Turn {
///     fn name(&self) -> &str {
///         match self {
///             Self::Draw => "Draw",
///             Self::Play => "Play",
///         }
///     }
/// }
///
/// let transition = PhaseTransition {
///     from: Turn::Draw,
///     to: Turn::Play,
///     event: "DrawCards",
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.to, Turn::Play);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseTransition<V, K> {
    /// The phase being left
    pub from: V,
    /// The phase being entered
    pub to: V,
    /// Tag of the event that fired the transition
    pub event: K,
    /// When the transition was committed
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of phase transitions.
///
/// # Example
///
/// ```rust
/// use turnstate::core::{Phase, PhaseHistory, PhaseTransition};
/// use serde::{Deserialize, Serialize};
/// use chrono::Utc;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Turn {
///     Stumbling,
///     Draw,
///     Play,
/// }
///
/// impl Phase for Turn {
///     fn name(&self) -> &str {
///         match self {
///             Self::Stumbling => "Stumbling",
///             Self::Draw => "Draw",
///             Self::Play => "Play",
///         }
///     }
/// }
///
/// let history = PhaseHistory::new()
///     .record(PhaseTransition {
///         from: Turn::Stumbling,
///         to: Turn::Draw,
///         event: 1u8,
///         timestamp: Utc::now(),
///     })
///     .record(PhaseTransition {
///         from: Turn::Draw,
///         to: Turn::Play,
///         event: 2u8,
///         timestamp: Utc::now(),
///     });
///
/// let path = history.get_path();
/// assert_eq!(path, vec![&Turn::Stumbling, &Turn::Draw, &Turn::Play]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PhaseHistory<V, K> {
    transitions: Vec<PhaseTransition<V, K>>,
}

impl<V: Phase, K: Clone> Default for PhaseHistory<V, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Phase, K: Clone> PhaseHistory<V, K> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Append a transition in place.
    pub fn push(&mut self, transition: PhaseTransition<V, K>) {
        self.transitions.push(transition);
    }

    /// Append a transition and hand the history back.
    pub fn record(mut self, transition: PhaseTransition<V, K>) -> Self {
        self.push(transition);
        self
    }

    /// Get the path of phases traversed.
    ///
    /// Returns the first source phase, then the target of each transition.
    pub fn get_path(&self) -> Vec<&V> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Time between the first and the last recorded transition.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> &[PhaseTransition<V, K>] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    enum TestPhase {
        Stumbling,
        Draw,
        Play,
    }

    impl Phase for TestPhase {
        fn name(&self) -> &str {
            match self {
                Self::Stumbling => "Stumbling",
                Self::Draw => "Draw",
                Self::Play => "Play",
            }
        }
    }

    fn step(from: TestPhase, to: TestPhase, event: &'static str) -> PhaseTransition<TestPhase, &'static str> {
        PhaseTransition {
            from,
            to,
            event,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history: PhaseHistory<TestPhase, &str> = PhaseHistory::new();
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
    }

    #[test]
    fn push_appends_in_place() {
        let mut history = PhaseHistory::new();
        history.push(step(TestPhase::Draw, TestPhase::Play, "DrawCards"));
        history.push(step(TestPhase::Play, TestPhase::Stumbling, "NextTurn"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.transitions()[1].to, TestPhase::Stumbling);
    }

    #[test]
    fn get_path_returns_phase_sequence() {
        let history = PhaseHistory::new()
            .record(step(TestPhase::Stumbling, TestPhase::Draw, "ResolveStumbling"))
            .record(step(TestPhase::Draw, TestPhase::Play, "DrawCards"))
            .record(step(TestPhase::Play, TestPhase::Stumbling, "NextTurn"));

        let path = history.get_path();
        assert_eq!(path.len(), 4);
        assert_eq!(path[0], &TestPhase::Stumbling);
        assert_eq!(path[2], &TestPhase::Play);
        assert_eq!(path[3], &TestPhase::Stumbling);
    }

    #[test]
    fn records_keep_event_tags() {
        let history = PhaseHistory::new()
            .record(step(TestPhase::Draw, TestPhase::Play, "DrawCards"))
            .record(step(TestPhase::Play, TestPhase::Stumbling, "NextTurn"));

        let tags: Vec<_> = history.transitions().iter().map(|t| t.event).collect();
        assert_eq!(tags, vec!["DrawCards", "NextTurn"]);
    }

    #[test]
    fn duration_calculates_elapsed_time() {
        let start = Utc::now();
        let history = PhaseHistory::new().record(PhaseTransition {
            from: TestPhase::Draw,
            to: TestPhase::Play,
            event: "DrawCards",
            timestamp: start,
        });

        std::thread::sleep(std::time::Duration::from_millis(10));

        let history = history.record(step(TestPhase::Play, TestPhase::Stumbling, "NextTurn"));

        let duration = history.duration();
        assert!(duration.is_some());
        assert!(duration.unwrap() >= std::time::Duration::from_millis(10));
    }

    #[test]
    fn history_serializes_correctly() {
        let history = PhaseHistory::new().record(PhaseTransition {
            from: TestPhase::Draw,
            to: TestPhase::Play,
            event: "DrawCards".to_string(),
            timestamp: Utc::now(),
        });

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: PhaseHistory<TestPhase, String> = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.transitions(), history.transitions());
    }
}
