//! Resolved states: the vertices of a state machine graph.

use crate::core::visitor::Visitor;
use crate::core::{Action, Transition};

/// A state after inheritance has been resolved.
///
/// `declared_in` names the state machine whose declaration of this state
/// survived the merge: the machine itself, or the ancestor it inherited
/// the state from.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedState {
    name: String,
    is_virtual: bool,
    is_abstract: bool,
    declared_in: String,
    entry: Vec<Action>,
    exit: Vec<Action>,
    transitions: Vec<Transition>,
}

impl ResolvedState {
    pub(crate) fn new(
        name: String,
        is_virtual: bool,
        is_abstract: bool,
        declared_in: String,
    ) -> Self {
        Self {
            name,
            is_virtual,
            is_abstract,
            declared_in,
            entry: Vec::new(),
            exit: Vec::new(),
            transitions: Vec::new(),
        }
    }

    pub(crate) fn with_behavior(
        mut self,
        entry: Vec<Action>,
        exit: Vec<Action>,
        transitions: Vec<Transition>,
    ) -> Self {
        self.entry = entry;
        self.exit = exit;
        self.transitions = transitions;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a descendant state machine may override this state.
    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    /// Whether this state is a placeholder that descendants must concretize.
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn declared_in(&self) -> &str {
        &self.declared_in
    }

    pub fn entry_actions(&self) -> &[Action] {
        &self.entry
    }

    pub fn exit_actions(&self) -> &[Action] {
        &self.exit
    }

    /// Outgoing transitions, in declaration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Outgoing transitions fired by `event`.
    pub fn transitions_on<'s>(&'s self, event: &'s str) -> impl Iterator<Item = &'s Transition> {
        self.transitions.iter().filter(move |t| t.event() == event)
    }

    /// Every action attached to this state: entry, transition, then exit.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.entry
            .iter()
            .chain(self.transitions.iter().flat_map(|t| t.actions().iter()))
            .chain(self.exit.iter())
    }

    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_state(self);
    }
}
