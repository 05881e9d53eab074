//! Builder for constructing state machines.

use crate::builder::error::{require, BuildError, BuildErrors};
use crate::core::{Event, Phase};
use crate::machine::{no_interceptor, Interceptor, Reducer, StateMachine, TransitionTable};
use std::sync::Arc;

/// Builder for constructing state machines with a fluent API.
///
/// `build` spawns the store's fold loop and must be called inside a tokio
/// runtime.
pub struct StateMachineBuilder<V: Phase, E: Event, T: Send + Sync + 'static> {
    table: Option<Arc<TransitionTable<V, E, T>>>,
    initial: Option<V>,
    payload: Option<T>,
    reducer: Option<Arc<dyn Reducer<E, T>>>,
    interceptor: Interceptor<T>,
}

impl<V, E, T> StateMachineBuilder<V, E, T>
where
    V: Phase,
    E: Event,
    T: Send + Sync + 'static,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            table: None,
            initial: None,
            payload: None,
            reducer: None,
            interceptor: no_interceptor(),
        }
    }

    /// Set the transition table (required). Tables may be shared.
    pub fn table(mut self, table: Arc<TransitionTable<V, E, T>>) -> Self {
        self.table = Some(table);
        self
    }

    /// Set the initial phase (required).
    pub fn initial(mut self, phase: V) -> Self {
        self.initial = Some(phase);
        self
    }

    /// Set the initial payload (required).
    pub fn payload(mut self, payload: T) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Set the reducer (required).
    pub fn reducer(mut self, reducer: impl Reducer<E, T> + 'static) -> Self {
        self.reducer = Some(Arc::new(reducer));
        self
    }

    /// Set the interceptor run after each committed snapshot (optional).
    pub fn interceptor<F>(mut self, interceptor: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.interceptor = Arc::new(interceptor);
        self
    }

    /// Build the state machine.
    /// Returns every missing field at once.
    pub fn build(self) -> Result<StateMachine<V, E, T>, BuildErrors> {
        match (self.table, self.initial, self.payload, self.reducer) {
            (Some(table), Some(initial), Some(payload), Some(reducer)) => Ok(StateMachine::new(
                table,
                initial,
                payload,
                reducer,
                self.interceptor,
            )),
            (table, initial, payload, reducer) => Err(BuildErrors::accumulate(vec![
                require(&table, BuildError::MissingTable),
                require(&initial, BuildError::MissingInitialPhase),
                require(&payload, BuildError::MissingPayload),
                require(&reducer, BuildError::MissingReducer),
            ])),
        }
    }
}

impl<V, E, T> Default for StateMachineBuilder<V, E, T>
where
    V: Phase,
    E: Event,
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::simple_transition;
    use crate::phase_enum;
    use std::sync::atomic::{AtomicUsize, Ordering};

    phase_enum! {
        enum TestPhase {
            Draw,
            Play,
        }
    }

    #[derive(Clone, Debug)]
    struct Tick;

    impl Event for Tick {
        type Tag = ();

        fn tag(&self) {}
    }

    fn table() -> Arc<TransitionTable<TestPhase, Tick, u32>> {
        Arc::new(
            TransitionTable::builder()
                .add_transition(simple_transition(TestPhase::Draw, TestPhase::Play, ()))
                .add_transition(simple_transition(TestPhase::Play, TestPhase::Draw, ()))
                .build()
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn builder_reports_all_missing_fields() {
        let result = StateMachineBuilder::<TestPhase, Tick, u32>::new()
            .initial(TestPhase::Draw)
            .build();

        let errors = result.err().unwrap();
        assert_eq!(
            errors,
            BuildErrors(vec![
                BuildError::MissingTable,
                BuildError::MissingPayload,
                BuildError::MissingReducer,
            ])
        );
    }

    #[tokio::test]
    async fn built_machine_runs() {
        let machine = StateMachine::builder()
            .table(table())
            .initial(TestPhase::Draw)
            .payload(0u32)
            .reducer(|count: &u32, _: Tick| count + 1)
            .build()
            .unwrap();

        machine.send(Tick).await.unwrap();
        machine.send(Tick).await.unwrap();

        assert_eq!(machine.current_phase(), TestPhase::Draw);
        assert_eq!(*machine.payload(), 2);
    }

    #[tokio::test]
    async fn one_table_backs_many_machines() {
        let shared = table();
        let first = StateMachine::builder()
            .table(Arc::clone(&shared))
            .initial(TestPhase::Draw)
            .payload(0u32)
            .reducer(|count: &u32, _: Tick| count + 1)
            .build()
            .unwrap();
        let second = StateMachine::builder()
            .table(shared)
            .initial(TestPhase::Play)
            .payload(10u32)
            .reducer(|count: &u32, _: Tick| count + 1)
            .build()
            .unwrap();

        first.send(Tick).await.unwrap();

        assert_eq!(first.current_phase(), TestPhase::Play);
        assert_eq!(second.current_phase(), TestPhase::Play);
        assert_eq!(*second.payload(), 10);
    }

    #[tokio::test]
    async fn interceptor_is_installed() {
        let seen = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&seen);
        let machine = StateMachine::builder()
            .table(table())
            .initial(TestPhase::Draw)
            .payload(0u32)
            .reducer(|count: &u32, _: Tick| count + 1)
            .interceptor(move |count: &u32| sink.store(*count as usize, Ordering::SeqCst))
            .build()
            .unwrap();

        machine.send(Tick).await.unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
