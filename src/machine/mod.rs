//! Live machinery: transition tables, the state store and the machine
//! that ties them together.
//!
//! A `TransitionTable` is a pure model and may be shared. `StateStore`
//! and `StateMachine` own a spawned fold loop and must be created inside
//! a tokio runtime.

mod error;
#[allow(clippy::module_inception)]
mod machine;
mod store;
mod table;

pub use error::{StoreError, TransitionError};
pub use machine::StateMachine;
pub use store::{no_interceptor, Interceptor, Reducer, StateStore};
pub use table::{Transition, TransitionTable};
