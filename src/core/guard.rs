//! Guard predicates for controlling state transitions.
//!
//! Guards are pure boolean functions over the current payload and the
//! incoming event. They compose by conjunction: `g1 + g2` accepts only
//! what both accept.

use std::fmt;
use std::ops::Add;
use std::sync::Arc;

/// Pure predicate that determines if a transition may fire.
///
/// Guards are evaluated against `(payload, event)` strictly before any
/// state is published. They are cheap to clone, so a machine-wide guard
/// can be shared by every transition registered after it.
///
/// # Example
///
/// ```rust
/// use turnstate::core::Guard;
///
/// let positive = Guard::new(|count: &i32, _event: &i32| *count > 0);
/// let small_step = Guard::new(|_count: &i32, step: &i32| *step < 10);
/// let both = positive + small_step;
///
/// assert!(both.check(&1, &3));
/// assert!(!both.check(&0, &3));
/// assert!(!both.check(&1, &30));
/// ```
pub struct Guard<T, E> {
    predicate: Arc<dyn Fn(&T, &E) -> bool + Send + Sync>,
}

impl<T, E> Guard<T, E> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic, free of side effects and
    /// thread-safe (Send + Sync).
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T, &E) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// The identity guard, which accepts every input.
    pub fn accept_all() -> Self
    where
        T: 'static,
        E: 'static,
    {
        Guard::new(|_, _| true)
    }

    /// Check whether the guard accepts this payload/event pair.
    pub fn check(&self, payload: &T, event: &E) -> bool {
        (self.predicate)(payload, event)
    }

    /// Logical conjunction of two guards.
    ///
    /// The right-hand guard is only evaluated when the left one accepts.
    pub fn and(&self, other: &Guard<T, E>) -> Guard<T, E>
    where
        T: 'static,
        E: 'static,
    {
        let first = Arc::clone(&self.predicate);
        let second = Arc::clone(&other.predicate);
        Guard {
            predicate: Arc::new(move |payload, event| {
                first(payload, event) && second(payload, event)
            }),
        }
    }
}

impl<T, E> Clone for Guard<T, E> {
    fn clone(&self) -> Self {
        Guard {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T: 'static, E: 'static> Default for Guard<T, E> {
    fn default() -> Self {
        Self::accept_all()
    }
}

impl<T: 'static, E: 'static> Add for Guard<T, E> {
    type Output = Guard<T, E>;

    fn add(self, other: Guard<T, E>) -> Guard<T, E> {
        self.and(&other)
    }
}

impl<T, E> fmt::Debug for Guard<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Table {
        current: u8,
        seated: Vec<u8>,
    }

    #[derive(Debug)]
    struct Move {
        origin: u8,
    }

    fn table() -> Table {
        Table {
            current: 1,
            seated: vec![1, 2, 3],
        }
    }

    #[test]
    fn guard_allows_matching_inputs() {
        let guard = Guard::new(|t: &Table, m: &Move| t.current == m.origin);

        assert!(guard.check(&table(), &Move { origin: 1 }));
        assert!(!guard.check(&table(), &Move { origin: 2 }));
    }

    #[test]
    fn accept_all_is_identity() {
        let guard: Guard<Table, Move> = Guard::accept_all();
        assert!(guard.check(&table(), &Move { origin: 9 }));

        let seated = Guard::new(|t: &Table, m: &Move| t.seated.contains(&m.origin));
        let combined = Guard::accept_all() + seated.clone();
        for origin in 0..5 {
            let event = Move { origin };
            assert_eq!(combined.check(&table(), &event), seated.check(&table(), &event));
        }
    }

    #[test]
    fn conjunction_requires_both() {
        let seated = Guard::new(|t: &Table, m: &Move| t.seated.contains(&m.origin));
        let current = Guard::new(|t: &Table, m: &Move| t.current == m.origin);
        let both = seated + current;

        assert!(both.check(&table(), &Move { origin: 1 }));
        assert!(!both.check(&table(), &Move { origin: 2 }));
        assert!(!both.check(&table(), &Move { origin: 7 }));
    }

    #[test]
    fn conjunction_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let reject = Guard::new(|_: &Table, _: &Move| false);
        let counted = Guard::new(move |_: &Table, _: &Move| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        let guard = reject + counted;
        assert!(!guard.check(&table(), &Move { origin: 1 }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn guard_is_deterministic() {
        let guard = Guard::new(|t: &Table, m: &Move| t.seated.contains(&m.origin));
        let event = Move { origin: 2 };

        assert_eq!(guard.check(&table(), &event), guard.check(&table(), &event));
    }
}
