//! Ensemble: resolution and verification of collaborative state machines
//!
//! A collaborative state machine is a set of named state machines that
//! interact through events. State machines may extend one another: a
//! descendant inherits its ancestors' states, actions, guards and context
//! declarations, and may override states declared `virtual` or `abstract`.
//!
//! # Core Concepts
//!
//! - **Declarations** (`decl`): the parsed, unresolved input model
//! - **Builder** (`builder`): merges inheritance and verifies the result
//! - **Resolved graph** (`core`): immutable states, transitions, actions, guards
//! - **Contexts** (`context`): scoped variable storage stacked into an `Extent`
//! - **Expressions** (`expr`): the value language of actions and guards
//!
//! # Example
//!
//! ```rust
//! use ensemble::builder::CollaborativeStateMachineBuilder;
//! use ensemble::context::{Extent, InMemoryContext, Scope};
//! use ensemble::decl::{
//!     ActionDecl, CollaborativeStateMachineDecl, StateDecl, StateMachineDecl, TransitionDecl,
//! };
//! use ensemble::expr::{Expr, Value};
//!
//! let decl = CollaborativeStateMachineDecl::new("csm")
//!     .with_state_machine(
//!         StateMachineDecl::new("base")
//!             .as_abstract()
//!             .with_state(StateDecl::new("idle").on(TransitionDecl::new("go", "done")))
//!             .with_state(StateDecl::new("done").as_abstract())
//!             .with_action(ActionDecl::assign("count", Expr::literal(1i64)).named("count")),
//!     )
//!     .with_state_machine(
//!         StateMachineDecl::new("worker")
//!             .extending("base")
//!             .with_state(StateDecl::new("done").on_entry(ActionDecl::raise("finished")))
//!             .with_action(ActionDecl::assign("count", Expr::literal(2i64)).named("count")),
//!     );
//!
//! let csm = CollaborativeStateMachineBuilder::new(&decl).build().unwrap();
//! let worker = csm.state_machine_by_name("worker").unwrap();
//! assert_eq!(worker.state_count(), 2);
//! assert_eq!(worker.output_events(), ["finished"]);
//!
//! let mut local = InMemoryContext::new(Scope::Local);
//! let mut extent = Extent::new(&mut local);
//! worker.action_by_name("count").unwrap().execute(&mut extent).unwrap();
//! assert_eq!(extent.get("count").unwrap(), Value::Integer(2));
//! ```

pub mod builder;
pub mod context;
pub mod core;
pub mod decl;
pub mod expr;

// Re-export commonly used types
pub use builder::{BuildOptions, CollaborativeStateMachineBuilder, Message, VerificationError};
pub use context::{Context, ContextError, Extent, InMemoryContext, Scope};
pub use crate::core::{CollaborativeStateMachine, ResolvedState, ResolvedStateMachine};
