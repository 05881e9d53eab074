//! Transition edges and the table that indexes them by source phase.

use crate::builder::TransitionTableBuilder;
use crate::core::{Event, Guard, Phase, Selector};
use std::collections::HashMap;

/// A transition edge from one phase to another.
///
/// `guard` is already the conjunction of the machine-wide guard that was
/// current when the edge was registered and the edge's own guard.
pub struct Transition<V, E: Event, T> {
    pub from: V,
    pub to: V,
    pub selector: Selector<E::Tag>,
    pub guard: Guard<T, E>,
}

impl<V: Phase, E: Event, T> Transition<V, E, T> {
    /// Whether this edge's selector matches the event's tag.
    pub fn selects(&self, event: &E) -> bool {
        self.selector.matches(&event.tag())
    }

    /// Whether the edge may fire for this payload/event pair (pure).
    pub fn accepts(&self, payload: &T, event: &E) -> bool {
        self.guard.check(payload, event)
    }
}

impl<V: Clone, E: Event, T> Clone for Transition<V, E, T> {
    fn clone(&self) -> Self {
        Self {
            from: self.from.clone(),
            to: self.to.clone(),
            selector: self.selector.clone(),
            guard: self.guard.clone(),
        }
    }
}

impl<V: std::fmt::Debug, E: Event, T> std::fmt::Debug for Transition<V, E, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

/// Maps each phase to its outgoing edges, in registration order.
///
/// A table is a reusable model: it holds no live state and can back any
/// number of machines.
pub struct TransitionTable<V, E: Event, T> {
    edges: HashMap<V, Vec<Transition<V, E, T>>>,
}

impl<V: Phase, E: Event, T: 'static> TransitionTable<V, E, T> {
    /// Start declaring a table.
    pub fn builder() -> TransitionTableBuilder<V, E, T> {
        TransitionTableBuilder::new()
    }

    pub(crate) fn from_transitions(transitions: Vec<Transition<V, E, T>>) -> Self {
        let mut edges: HashMap<V, Vec<Transition<V, E, T>>> = HashMap::new();
        for transition in transitions {
            edges
                .entry(transition.from.clone())
                .or_default()
                .push(transition);
        }
        Self { edges }
    }

    /// All edges leaving `phase`.
    pub fn edges_from(&self, phase: &V) -> &[Transition<V, E, T>] {
        self.edges.get(phase).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first edge out of `phase` whose selector matches the event.
    pub fn select(&self, phase: &V, event: &E) -> Option<&Transition<V, E, T>> {
        self.edges_from(phase).iter().find(|edge| edge.selects(event))
    }

    /// Total number of edges.
    pub fn len(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
