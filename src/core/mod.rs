//! Core state machine vocabulary.
//!
//! This module contains the pure building blocks of the machine:
//! - Phase markers via the `Phase` trait
//! - Tagged events and edge selectors
//! - Guard predicates over (payload, event)
//! - Immutable transition history
//!
//! Nothing in here spawns tasks or touches channels.

mod event;
mod guard;
mod history;
mod phase;

pub use event::{Event, Selector};
pub use guard::Guard;
pub use history::{PhaseHistory, PhaseTransition};
pub use phase::Phase;
