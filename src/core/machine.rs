//! Resolved state machines: graphs of resolved states.

use crate::context::{Context, Extent, InMemoryContext, Scope};
use crate::core::visitor::Visitor;
use crate::core::{Action, GraphError, Guard, ResolvedState, Transition};
use crate::expr::{EvaluationError, Expr};
use indexmap::IndexMap;

/// A state machine with inheritance resolved and verified.
///
/// States are the vertices of a directed graph whose edges are the
/// transitions. All tables are keyed by name and keep the merge order:
/// inherited entries first, in ancestor declaration order, overrides in
/// place, then entries new to the descendant.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedStateMachine {
    pub(crate) name: String,
    pub(crate) is_abstract: bool,
    pub(crate) ancestors: Vec<String>,
    pub(crate) states: IndexMap<String, ResolvedState>,
    pub(crate) actions: IndexMap<String, Action>,
    pub(crate) guards: IndexMap<String, Guard>,
    pub(crate) local_context: IndexMap<String, Expr>,
    pub(crate) persistent_context: IndexMap<String, Expr>,
    pub(crate) input_events: Vec<String>,
    pub(crate) output_events: Vec<String>,
}

impl ResolvedStateMachine {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Abstract machines are never executed directly. The flag is taken
    /// from the machine's own declaration, never inherited.
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// The state machine this one directly extends.
    pub fn extends(&self) -> Option<&str> {
        self.ancestors.first().map(String::as_str)
    }

    /// Ancestor chain, nearest first.
    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    /// The vertex set: every resolved state, in merge order.
    pub fn states(&self) -> impl Iterator<Item = &ResolvedState> {
        self.states.values()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn state_by_name(&self, name: &str) -> Result<&ResolvedState, GraphError> {
        self.states.get(name).ok_or_else(|| GraphError::UnknownState {
            state_machine: self.name.clone(),
            state: name.to_string(),
        })
    }

    /// The edge set: every transition paired with its source state.
    pub fn edges(&self) -> impl Iterator<Item = (&ResolvedState, &Transition)> {
        self.states
            .values()
            .flat_map(|state| state.transitions().iter().map(move |t| (state, t)))
    }

    /// States with a transition into `name`.
    pub fn predecessors(&self, name: &str) -> Result<Vec<&ResolvedState>, GraphError> {
        self.state_by_name(name)?;
        let mut sources: Vec<&ResolvedState> = Vec::new();
        for (source, transition) in self.edges() {
            if transition.target() == name && !sources.iter().any(|s| s.name() == source.name()) {
                sources.push(source);
            }
        }
        Ok(sources)
    }

    /// Named actions of the merged action table.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.values()
    }

    pub fn action_by_name(&self, name: &str) -> Result<&Action, GraphError> {
        self.actions.get(name).ok_or_else(|| GraphError::UnknownAction {
            state_machine: self.name.clone(),
            action: name.to_string(),
        })
    }

    /// Named guards of the merged guard table.
    pub fn guards(&self) -> impl Iterator<Item = &Guard> {
        self.guards.values()
    }

    pub fn guard_by_name(&self, name: &str) -> Result<&Guard, GraphError> {
        self.guards.get(name).ok_or_else(|| GraphError::UnknownGuard {
            state_machine: self.name.clone(),
            guard: name.to_string(),
        })
    }

    /// Events handled by this machine, in first-seen merge order.
    pub fn input_events(&self) -> &[String] {
        &self.input_events
    }

    /// Events raised by this machine's actions, in first-seen merge order.
    pub fn output_events(&self) -> &[String] {
        &self.output_events
    }

    pub fn handles(&self, event: &str) -> bool {
        self.input_events.iter().any(|e| e == event)
    }

    /// Merged local context declarations.
    pub fn local_context(&self) -> impl Iterator<Item = (&str, &Expr)> {
        self.local_context.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merged persistent context declarations.
    pub fn persistent_context(&self) -> impl Iterator<Item = (&str, &Expr)> {
        self.persistent_context.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Evaluate the local context declarations into a fresh context.
    ///
    /// Initializers run in order; each may read the variables declared
    /// before it.
    pub fn create_local_context(&self) -> Result<InMemoryContext, EvaluationError> {
        initialize(Scope::Local, &self.local_context)
    }

    /// Evaluate the persistent context declarations into a fresh context.
    pub fn create_persistent_context(&self) -> Result<InMemoryContext, EvaluationError> {
        initialize(Scope::Persistent, &self.persistent_context)
    }

    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_state_machine(self);
    }
}

fn initialize(
    scope: Scope,
    declarations: &IndexMap<String, Expr>,
) -> Result<InMemoryContext, EvaluationError> {
    let mut context = InMemoryContext::new(scope);
    for (name, initializer) in declarations {
        let value = initializer.evaluate(&Extent::new(&mut context))?;
        context.create(name, value)?;
    }
    Ok(context)
}
