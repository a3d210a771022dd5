//! Traversal of the resolved graph.
//!
//! Every resolved element has an `accept` method that dispatches to the
//! matching `visit_*` method. The default implementations walk into the
//! element's children, so an implementor overrides only the methods it is
//! interested in and calls the matching `walk_*` function to keep descending.
//!
//! # Example
//!
//! ```
//! use ensemble::core::{ResolvedState, Visitor};
//!
//! #[derive(Default)]
//! struct StateCounter(usize);
//!
//! impl Visitor for StateCounter {
//!     fn visit_state(&mut self, state: &ResolvedState) {
//!         self.0 += 1;
//!         ensemble::core::visitor::walk_state(self, state);
//!     }
//! }
//! ```

use crate::core::{
    Action, CollaborativeStateMachine, Guard, ResolvedState, ResolvedStateMachine, Transition,
};

pub trait Visitor {
    fn visit_collaborative_state_machine(&mut self, csm: &CollaborativeStateMachine) {
        walk_collaborative_state_machine(self, csm);
    }

    fn visit_state_machine(&mut self, state_machine: &ResolvedStateMachine) {
        walk_state_machine(self, state_machine);
    }

    fn visit_state(&mut self, state: &ResolvedState) {
        walk_state(self, state);
    }

    fn visit_transition(&mut self, transition: &Transition) {
        walk_transition(self, transition);
    }

    fn visit_action(&mut self, _action: &Action) {}

    fn visit_guard(&mut self, _guard: &Guard) {}
}

pub fn walk_collaborative_state_machine<V: Visitor + ?Sized>(
    visitor: &mut V,
    csm: &CollaborativeStateMachine,
) {
    for state_machine in csm.state_machines() {
        state_machine.accept(visitor);
    }
}

/// Visits the states of a machine, then its named actions and guards.
pub fn walk_state_machine<V: Visitor + ?Sized>(
    visitor: &mut V,
    state_machine: &ResolvedStateMachine,
) {
    for state in state_machine.states() {
        state.accept(visitor);
    }
    for action in state_machine.actions() {
        action.accept(visitor);
    }
    for guard in state_machine.guards() {
        guard.accept(visitor);
    }
}

pub fn walk_state<V: Visitor + ?Sized>(visitor: &mut V, state: &ResolvedState) {
    for action in state.entry_actions() {
        action.accept(visitor);
    }
    for transition in state.transitions() {
        transition.accept(visitor);
    }
    for action in state.exit_actions() {
        action.accept(visitor);
    }
}

pub fn walk_transition<V: Visitor + ?Sized>(visitor: &mut V, transition: &Transition) {
    if let Some(guard) = transition.guard() {
        guard.accept(visitor);
    }
    for action in transition.actions() {
        action.accept(visitor);
    }
}
