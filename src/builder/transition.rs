//! Builder for constructing transition edges.

use crate::builder::error::{require, BuildError, BuildErrors};
use crate::core::{Event, Guard, Phase, Selector};
use crate::machine::Transition;

/// Builder for constructing transitions with a fluent API.
pub struct TransitionBuilder<V, E: Event, T> {
    from: Option<V>,
    to: Option<V>,
    selector: Option<Selector<E::Tag>>,
    guard: Option<Guard<T, E>>,
}

impl<V: Phase, E: Event, T: 'static> TransitionBuilder<V, E, T> {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            from: None,
            to: None,
            selector: None,
            guard: None,
        }
    }

    /// Set the source phase (required).
    pub fn from(mut self, phase: V) -> Self {
        self.from = Some(phase);
        self
    }

    /// Set the target phase (required).
    pub fn to(mut self, phase: V) -> Self {
        self.to = Some(phase);
        self
    }

    /// Set which event tags fire this edge (required).
    pub fn via(mut self, selector: impl Into<Selector<E::Tag>>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    /// Add a guard (optional). Repeated calls are conjoined.
    pub fn guard(mut self, guard: Guard<T, E>) -> Self {
        self.guard = Some(match self.guard.take() {
            Some(existing) => existing + guard,
            None => guard,
        });
        self
    }

    /// Add a guard using a closure (optional).
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&T, &E) -> bool + Send + Sync + 'static,
    {
        self.guard(Guard::new(predicate))
    }

    /// Build the transition, reporting every missing field.
    pub fn build(self) -> Result<Transition<V, E, T>, BuildErrors> {
        match (self.from, self.to, self.selector) {
            (Some(from), Some(to), Some(selector)) => Ok(Transition {
                from,
                to,
                selector,
                guard: self.guard.unwrap_or_default(),
            }),
            (from, to, selector) => Err(BuildErrors::accumulate(vec![
                require(&from, BuildError::MissingFromPhase),
                require(&to, BuildError::MissingToPhase),
                require(&selector, BuildError::MissingSelector),
            ])),
        }
    }
}

impl<V: Phase, E: Event, T: 'static> Default for TransitionBuilder<V, E, T> {
    fn default() -> Self {
        Self::new()
    }
}
