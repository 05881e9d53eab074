//! Builder API for ergonomic machine construction.
//!
//! This module provides fluent builders and macros for declaring
//! transition tables and machines with minimal boilerplate.

pub mod error;
pub mod machine;
pub mod macros;
pub mod table;
pub mod transition;

pub use error::{BuildError, BuildErrors};
pub use machine::StateMachineBuilder;
pub use table::TransitionTableBuilder;
pub use transition::TransitionBuilder;

use crate::core::{Event, Guard, Phase, Selector};
use crate::machine::Transition;

/// Create an unguarded transition.
///
/// # Example
///
/// ```
/// use turnstate::builder::simple_transition;
/// use turnstate::core::Event;
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
/// struct Draw;
///
/// impl Event for Draw {
///     type Tag = ();
///
///     fn tag(&self) {}
/// }
///
/// let transition = simple_transition::<Turn, Draw, ()>(Turn::Draw, Turn::Play, ());
/// assert!(transition.accepts(&(), &Draw));
/// ```
pub fn simple_transition<V, E, T>(
    from: V,
    to: V,
    selector: impl Into<Selector<E::Tag>>,
) -> Transition<V, E, T>
where
    V: Phase,
    E: Event,
    T: 'static,
{
    Transition {
        from,
        to,
        selector: selector.into(),
        guard: Guard::accept_all(),
    }
}

/// Create a transition with a guard predicate.
pub fn guarded_transition<V, E, T, F>(
    from: V,
    to: V,
    selector: impl Into<Selector<E::Tag>>,
    guard: F,
) -> Transition<V, E, T>
where
    V: Phase,
    E: Event,
    T: 'static,
    F: Fn(&T, &E) -> bool + Send + Sync + 'static,
{
    Transition {
        from,
        to,
        selector: selector.into(),
        guard: Guard::new(guard),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase_enum;

    phase_enum! {
        enum TestPhase {
            Start,
            End,
        }
        final: [End]
    }

    #[derive(Clone, Debug)]
    struct Finish(bool);

    impl Event for Finish {
        type Tag = ();

        fn tag(&self) {}
    }

    #[test]
    fn simple_transition_builds() {
        let transition =
            simple_transition::<TestPhase, Finish, ()>(TestPhase::Start, TestPhase::End, ());

        assert_eq!(transition.from, TestPhase::Start);
        assert_eq!(transition.to, TestPhase::End);
        assert!(transition.accepts(&(), &Finish(false)));
    }

    #[test]
    fn guarded_transition_respects_guard() {
        let transition = guarded_transition(
            TestPhase::Start,
            TestPhase::End,
            (),
            |_: &(), event: &Finish| event.0,
        );

        assert!(transition.accepts(&(), &Finish(true)));
        assert!(!transition.accepts(&(), &Finish(false)));
    }
}
