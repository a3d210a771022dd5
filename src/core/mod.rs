//! The resolved object graph.
//!
//! This module contains the output of the resolution pipeline:
//! - `CollaborativeStateMachine`, the set of resolved state machines
//! - `ResolvedStateMachine`, a graph of states connected by transitions
//! - `Action` and `Guard`, the executable behavior attached to the graph
//! - `Visitor`, the double-dispatch traversal over all of the above
//!
//! Everything here is immutable once built. Actions and guards only touch
//! the contexts of the extent they are given.

mod action;
mod collaborative;
mod error;
mod guard;
mod machine;
mod state;
mod transition;
pub mod visitor;

pub use action::{Action, ActionOutcome, Event};
pub use collaborative::{Collaboration, CollaborativeStateMachine};
pub use error::GraphError;
pub use guard::Guard;
pub use machine::ResolvedStateMachine;
pub use state::ResolvedState;
pub use transition::Transition;
pub use visitor::Visitor;
