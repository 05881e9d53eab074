//! Turnstate: a guarded reactive state machine and an action interpreter
//! for turn-based multi-party sessions.
//!
//! The crate has two halves. The first is a state machine whose coarse
//! phase moves along a declarative transition table while its payload is
//! folded by a single-consumer store. The second describes turn content as
//! programs of primitive steps and walks them on either side of a session,
//! resolving each step where it belongs.
//!
//! # Core Concepts
//!
//! - **Phase**: the coarse state marker, via the `Phase` trait or `phase_enum!`
//! - **Guards**: `(payload, event)` predicates; `+` is conjunction
//! - **Store**: capacity-1 queue, reducer fold, replay-one observable
//! - **Programs**: continuation-chained primitive steps, built with `program!`
//! - **Sessions**: channel pairs per participant and the routers that drive them
//!
//! # Example
//!
//! ```rust
//! use turnstate::builder::TransitionBuilder;
//! use turnstate::core::Event;
//! use turnstate::machine::{StateMachine, TransitionTable};
//! use turnstate::phase_enum;
//! use std::sync::Arc;
//!
//! phase_enum! {
//!     pub enum Light {
//!         Red,
//!         Green,
//!     }
//! }
//!
//! #[derive(Clone, Debug)]
//! struct Switch;
//!
//! impl Event for Switch {
//!     type Tag = ();
//!     fn tag(&self) {}
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let table = TransitionTable::builder()
//!     .transition(TransitionBuilder::new().from(Light::Red).to(Light::Green).via(()))
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let machine = StateMachine::builder()
//!     .table(Arc::new(table))
//!     .initial(Light::Red)
//!     .payload(0u32)
//!     .reducer(|count: &u32, _: Switch| count + 1)
//!     .build()
//!     .unwrap();
//!
//! machine.send(Switch).await.unwrap();
//! assert_eq!(machine.current_phase(), Light::Green);
//! assert_eq!(*machine.payload(), 1);
//! # });
//! ```

pub mod action;
pub mod builder;
pub mod config;
pub mod core;
pub mod game;
pub mod interpreter;
pub mod logging;
pub mod machine;
pub mod session;

// Re-export commonly used types
pub use action::{Outcome, Program, Reply, Request, Side};
pub use builder::{BuildError, BuildErrors, StateMachineBuilder, TransitionBuilder};
pub use config::{ConfigError, TableConfig};
pub use core::{Event, Guard, Phase, PhaseHistory, PhaseTransition, Selector};
pub use interpreter::{Authority, InterpretError, Interpreter, Participant};
pub use machine::{Reducer, StateMachine, StateStore, StoreError, TransitionError, TransitionTable};
pub use session::{Command, Link, Origin, SessionError};
