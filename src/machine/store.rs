//! Single-writer state store.
//!
//! Events go through a queue with exactly one slot and are folded, one at
//! a time, into the payload by a reducer. Each new snapshot is shown to the
//! interceptor and then published on a `watch` channel, which replays the
//! latest snapshot to every new subscriber.

use crate::machine::error::StoreError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

/// Folds an event into the payload, producing the next snapshot.
///
/// Must be total over the event catalog and must not mutate its input.
/// It may suspend.
#[async_trait]
pub trait Reducer<E, T>: Send + Sync
where
    E: Send + 'static,
    T: Send + Sync + 'static,
{
    async fn reduce(&self, payload: &T, event: E) -> T;
}

#[async_trait]
impl<E, T, F> Reducer<E, T> for F
where
    F: Fn(&T, E) -> T + Send + Sync,
    E: Send + 'static,
    T: Send + Sync + 'static,
{
    async fn reduce(&self, payload: &T, event: E) -> T {
        self(payload, event)
    }
}

/// Side-effect-only observer run after every committed snapshot.
///
/// A panic inside an interceptor kills the fold loop; the store reports
/// `StoreError::Closed` from then on.
pub type Interceptor<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Interceptor that does nothing.
pub fn no_interceptor<T: 'static>() -> Interceptor<T> {
    Arc::new(|_: &T| {})
}

struct Queued<E> {
    event: E,
    committed: Option<oneshot::Sender<()>>,
}

/// Ordered event queue feeding a reducer, with the current payload exposed
/// as a hot observable.
///
/// The store must be created inside a tokio runtime; it spawns its fold
/// loop on creation. The loop ends once every handle is dropped.
pub struct StateStore<E, T> {
    events: mpsc::Sender<Queued<E>>,
    state: watch::Receiver<Arc<T>>,
}

impl<E, T> Clone for StateStore<E, T> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
            state: self.state.clone(),
        }
    }
}

impl<E, T> StateStore<E, T>
where
    E: Send + 'static,
    T: Send + Sync + 'static,
{
    /// Spawn the fold loop and return a handle to it.
    pub fn spawn(
        initial: T,
        reducer: Arc<dyn Reducer<E, T>>,
        interceptor: Interceptor<T>,
    ) -> Self {
        let (events, mut queue) = mpsc::channel::<Queued<E>>(1);
        let (publisher, state) = watch::channel(Arc::new(initial));

        tokio::spawn(async move {
            while let Some(Queued { event, committed }) = queue.recv().await {
                let current = Arc::clone(&*publisher.borrow());
                let next = reducer.reduce(&current, event).await;
                interceptor(&next);
                publisher.send_replace(Arc::new(next));
                if let Some(ack) = committed {
                    let _ = ack.send(());
                }
            }
            tracing::debug!("state store fold loop finished");
        });

        Self { events, state }
    }

    /// Enqueue an event, waiting until the single slot is free.
    ///
    /// Returns once the event is queued, not once it is reduced.
    pub async fn send(&self, event: E) -> Result<(), StoreError> {
        self.events
            .send(Queued {
                event,
                committed: None,
            })
            .await
            .map_err(|_| StoreError::Closed)
    }

    /// Enqueue without waiting. Fails with `Rejected` if the slot is taken.
    ///
    /// Do not use where the order of effects matters.
    pub fn try_send(&self, event: E) -> Result<(), StoreError> {
        self.events
            .try_send(Queued {
                event,
                committed: None,
            })
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => StoreError::Rejected,
                mpsc::error::TrySendError::Closed(_) => StoreError::Closed,
            })
    }

    /// Enqueue an event and wait until its snapshot has been published.
    pub async fn commit(&self, event: E) -> Result<(), StoreError> {
        let (ack, committed) = oneshot::channel();
        self.events
            .send(Queued {
                event,
                committed: Some(ack),
            })
            .await
            .map_err(|_| StoreError::Closed)?;
        committed.await.map_err(|_| StoreError::Closed)
    }

    /// The latest published snapshot.
    pub fn current(&self) -> Arc<T> {
        Arc::clone(&*self.state.borrow())
    }

    /// Subscribe to snapshots. The receiver starts at the latest one.
    pub fn subscribe(&self) -> watch::Receiver<Arc<T>> {
        self.state.clone()
    }

    /// Whether the fold loop is still consuming events.
    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn summing_store() -> StateStore<i64, i64> {
        StateStore::spawn(0, Arc::new(|total: &i64, n: i64| total + n), no_interceptor())
    }

    #[tokio::test]
    async fn commit_publishes_new_snapshot() {
        let store = summing_store();

        store.commit(5).await.unwrap();
        store.commit(7).await.unwrap();

        assert_eq!(*store.current(), 12);
    }

    #[tokio::test]
    async fn subscribers_replay_latest_snapshot() {
        let store = summing_store();
        store.commit(3).await.unwrap();

        let late = store.subscribe();
        assert_eq!(**late.borrow(), 3);
    }

    #[tokio::test]
    async fn sent_events_are_folded_in_order() {
        let store: StateStore<char, String> = StateStore::spawn(
            String::new(),
            Arc::new(|s: &String, c: char| format!("{s}{c}")),
            no_interceptor(),
        );
        let mut snapshots = store.subscribe();

        for c in ['a', 'b', 'c'] {
            store.send(c).await.unwrap();
        }
        while snapshots.borrow_and_update().as_str() != "abc" {
            snapshots.changed().await.unwrap();
        }

        assert_eq!(store.current().as_str(), "abc");
    }

    #[tokio::test]
    async fn interceptor_sees_every_committed_snapshot() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let store: StateStore<i64, i64> = StateStore::spawn(
            0,
            Arc::new(|total: &i64, n: i64| total + n),
            Arc::new(move |total: &i64| sink.lock().unwrap().push(*total)),
        );

        store.commit(1).await.unwrap();
        store.commit(2).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 3]);
    }

    #[tokio::test]
    async fn try_send_rejects_when_slot_is_occupied() {
        struct Blocking {
            release: tokio::sync::Semaphore,
        }

        #[async_trait]
        impl Reducer<i64, i64> for Blocking {
            async fn reduce(&self, total: &i64, n: i64) -> i64 {
                let _permit = self.release.acquire().await.unwrap();
                total + n
            }
        }

        let reducer = Arc::new(Blocking {
            release: tokio::sync::Semaphore::new(0),
        });
        let store: StateStore<i64, i64> =
            StateStore::spawn(0, reducer.clone(), no_interceptor());

        // The loop takes the first event and blocks inside the reducer.
        store.send(1).await.unwrap();
        tokio::task::yield_now().await;
        while store.events.capacity() == 0 {
            tokio::task::yield_now().await;
        }

        // The second fills the slot, so the third must be rejected.
        store.try_send(2).unwrap();
        assert_eq!(store.try_send(3), Err(StoreError::Rejected));

        reducer.release.add_permits(2);
        let mut snapshots = store.subscribe();
        while **snapshots.borrow_and_update() != 3 {
            snapshots.changed().await.unwrap();
        }
    }

    #[tokio::test]
    async fn concurrent_sends_apply_to_distinct_snapshots() {
        let applied = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&applied);
        let store: StateStore<&'static str, Vec<&'static str>> = StateStore::spawn(
            Vec::new(),
            Arc::new(move |log: &Vec<&'static str>, entry: &'static str| {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut next = log.clone();
                next.push(entry);
                next
            }),
            no_interceptor(),
        );

        let first = store.clone();
        let second = store.clone();
        let (a, b) = tokio::join!(
            tokio::spawn(async move { first.commit("left").await }),
            tokio::spawn(async move { second.commit("right").await }),
        );
        a.unwrap().unwrap();
        b.unwrap().unwrap();

        let log = store.current();
        assert_eq!(log.len(), 2);
        assert!(log.contains(&"left") && log.contains(&"right"));
        assert_eq!(applied.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn panicking_interceptor_closes_the_store() {
        let store: StateStore<i64, i64> = StateStore::spawn(
            0,
            Arc::new(|total: &i64, n: i64| total + n),
            Arc::new(|total: &i64| {
                if *total > 1 {
                    panic!("interceptor failure");
                }
            }),
        );

        store.commit(1).await.unwrap();
        assert_eq!(store.commit(5).await, Err(StoreError::Closed));
        assert_eq!(*store.current(), 1);
    }
}
