//! Builder for transition tables.

use crate::builder::error::{BuildError, BuildErrors};
use crate::builder::transition::TransitionBuilder;
use crate::core::{Event, Guard, Phase};
use crate::machine::{Transition, TransitionTable};

/// Declares the edges of a transition table.
///
/// The machine-wide guard is cumulative and is captured when each edge is
/// registered: an edge only sees the global guards added before it.
///
/// # Example
///
/// ```rust
/// use turnstate::builder::TransitionBuilder;
/// use turnstate::core::{Event, Guard};
/// use turnstate::machine::TransitionTable;
/// use turnstate::phase_enum;
///
/// phase_enum! {
///     enum Turn {
///         Draw,
///         Play,
///     }
/// }
///
/// #[derive(Clone, Debug)]
/// struct Step(u8);
///
/// impl Event for Step {
///     type Tag = ();
///
///     fn tag(&self) {}
/// }
///
/// let table: TransitionTable<Turn, Step, u8> = TransitionTable::builder()
///     .transition(TransitionBuilder::new().from(Turn::Draw).to(Turn::Play).via(()))
///     .unwrap()
///     .global_guard(Guard::new(|seat: &u8, step: &Step| step.0 == *seat))
///     .transition(TransitionBuilder::new().from(Turn::Play).to(Turn::Draw).via(()))
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let first = table.select(&Turn::Draw, &Step(1)).unwrap();
/// let second = table.select(&Turn::Play, &Step(1)).unwrap();
/// assert!(first.accepts(&0, &Step(1)));
/// assert!(!second.accepts(&0, &Step(1)));
/// ```
pub struct TransitionTableBuilder<V, E: Event, T> {
    global: Guard<T, E>,
    transitions: Vec<Transition<V, E, T>>,
}

impl<V: Phase, E: Event, T: 'static> TransitionTableBuilder<V, E, T> {
    pub fn new() -> Self {
        Self {
            global: Guard::accept_all(),
            transitions: Vec::new(),
        }
    }

    /// Conjoin a guard into the machine-wide guard.
    ///
    /// Only edges registered after this call are affected.
    pub fn global_guard(mut self, guard: Guard<T, E>) -> Self {
        self.global = self.global.and(&guard);
        self
    }

    /// Add a transition using a builder.
    /// Returns every missing field if the builder is incomplete.
    pub fn transition(self, builder: TransitionBuilder<V, E, T>) -> Result<Self, BuildErrors> {
        let transition = builder.build()?;
        Ok(self.add_transition(transition))
    }

    /// Add a pre-built transition, guarding it with the current global guard.
    pub fn add_transition(mut self, mut transition: Transition<V, E, T>) -> Self {
        transition.guard = self.global.and(&transition.guard);
        self.transitions.push(transition);
        self
    }

    /// Add multiple pre-built transitions at once.
    pub fn transitions(self, transitions: impl IntoIterator<Item = Transition<V, E, T>>) -> Self {
        transitions
            .into_iter()
            .fold(self, |builder, transition| builder.add_transition(transition))
    }

    pub fn build(self) -> Result<TransitionTable<V, E, T>, BuildErrors> {
        if self.transitions.is_empty() {
            return Err(BuildError::NoTransitions.into());
        }
        Ok(TransitionTable::from_transitions(self.transitions))
    }
}

impl<V: Phase, E: Event, T: 'static> Default for TransitionTableBuilder<V, E, T> {
    fn default() -> Self {
        Self::new()
    }
}
