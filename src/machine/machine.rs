//! Finite state machine over a transition table and a state store.

use crate::builder::StateMachineBuilder;
use crate::core::{Event, Phase, PhaseHistory, PhaseTransition};
use crate::machine::error::TransitionError;
use crate::machine::store::{Interceptor, Reducer, StateStore};
use crate::machine::table::TransitionTable;
use chrono::Utc;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

/// Guarded state machine.
///
/// The coarse phase and the payload are two separate hot observables.
/// `send` validates an event against the phase current at validation
/// time, then publishes the new phase and forwards the event to the store
/// concurrently. It does not serialize concurrent callers; callers that
/// race must layer their own ordering on top.
pub struct StateMachine<V: Phase, E: Event, T> {
    table: Arc<TransitionTable<V, E, T>>,
    phase: watch::Sender<V>,
    store: StateStore<E, T>,
    history: Mutex<PhaseHistory<V, E::Tag>>,
}

impl<V, E, T> StateMachine<V, E, T>
where
    V: Phase,
    E: Event,
    T: Send + Sync + 'static,
{
    /// Start declaring a machine.
    pub fn builder() -> StateMachineBuilder<V, E, T> {
        StateMachineBuilder::new()
    }

    /// Create a machine from a (possibly shared) table.
    ///
    /// Spawns the store's fold loop, so this must run inside a tokio runtime.
    pub fn new(
        table: Arc<TransitionTable<V, E, T>>,
        initial: V,
        payload: T,
        reducer: Arc<dyn Reducer<E, T>>,
        interceptor: Interceptor<T>,
    ) -> Self {
        let (phase, _) = watch::channel(initial);
        Self {
            table,
            phase,
            store: StateStore::spawn(payload, reducer, interceptor),
            history: Mutex::new(PhaseHistory::new()),
        }
    }

    /// Current phase (pure read).
    pub fn current_phase(&self) -> V {
        self.phase.borrow().clone()
    }

    /// Subscribe to phase changes. The receiver starts at the current phase.
    pub fn phase(&self) -> watch::Receiver<V> {
        self.phase.subscribe()
    }

    /// Latest payload snapshot.
    pub fn payload(&self) -> Arc<T> {
        self.store.current()
    }

    /// Subscribe to payload snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Arc<T>> {
        self.store.subscribe()
    }

    pub fn store(&self) -> &StateStore<E, T> {
        &self.store
    }

    pub fn table(&self) -> &TransitionTable<V, E, T> {
        &self.table
    }

    /// Whether the machine sits in a terminal phase.
    pub fn is_final(&self) -> bool {
        self.phase.borrow().is_final()
    }

    /// Snapshot of accepted transitions so far.
    pub fn history(&self) -> PhaseHistory<V, E::Tag> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Check whether `event` would be accepted right now, without sending it.
    ///
    /// Returns the phase the machine would move to.
    pub fn validate(&self, event: &E) -> Result<V, TransitionError<V, E>> {
        self.validate_from(&self.current_phase(), event)
    }

    fn validate_from(&self, state: &V, event: &E) -> Result<V, TransitionError<V, E>> {
        let Some(edge) = self.table.select(state, event) else {
            return Err(TransitionError::InvalidTransition {
                state: state.clone(),
                event: event.clone(),
            });
        };

        let payload = self.store.current();
        if !edge.accepts(&payload, event) {
            return Err(TransitionError::GuardFailed {
                state: state.clone(),
                event: event.clone(),
            });
        }

        Ok(edge.to.clone())
    }

    /// Send an event, transitioning to the phase its edge points at.
    ///
    /// On success both observables hold the post-event values. If the store
    /// cannot take the event the published phase is rolled back, so neither
    /// observable keeps the advance.
    pub async fn send(&self, event: E) -> Result<(), TransitionError<V, E>> {
        let from = self.current_phase();
        let to = match self.validate_from(&from, &event) {
            Ok(to) => to,
            Err(err) => {
                tracing::debug!(phase = from.name(), event = ?event.tag(), "event refused: {err}");
                return Err(err);
            }
        };
        let tag = event.tag();

        let publish = async {
            self.phase.send_replace(to.clone());
        };
        let ((), forwarded) = tokio::join!(publish, self.store.commit(event));
        if let Err(err) = forwarded {
            // Undo the publish unless a later send already moved on.
            self.phase.send_if_modified(|phase| {
                let published = *phase == to;
                if published {
                    *phase = from.clone();
                }
                published
            });
            tracing::warn!(phase = from.name(), event = ?tag, "store refused event: {err}");
            return Err(err.into());
        }

        tracing::debug!(from = from.name(), to = to.name(), event = ?tag, "phase transition");
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        history.push(PhaseTransition {
            from,
            to,
            event: tag,
            timestamp: Utc::now(),
        });
        Ok(())
    }
}
