//! A minimal but playable turn model for "The Bug Is A Lie".
//!
//! Supplies the payload, events, guards and reducer that the generic
//! machine runs on, and the [`Table`] that owns the authoritative copy.

pub mod cards;
mod event;
mod rules;
mod state;
mod table;

pub use cards::{BugReport, Card, CardKind, Character, Excuse, Role, Solution};
pub use event::{EventKind, GameEvent};
pub use rules::{reduce, turn_table, TurnReducer, TurnTable};
pub use state::{GameState, PendingAttack, Player, PlayerId, Turn};
pub use table::{logging_interceptor, Table, TableError, TableMachine, TableTransitionError};
