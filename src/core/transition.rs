//! Transition edges between resolved states.

use crate::context::Extent;
use crate::core::visitor::Visitor;
use crate::core::{Action, Guard};
use crate::expr::EvaluationError;

/// An edge of a state machine graph, fired by `event`.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    event: String,
    target: String,
    guard: Option<Guard>,
    actions: Vec<Action>,
}

impl Transition {
    pub fn new(
        event: impl Into<String>,
        target: impl Into<String>,
        guard: Option<Guard>,
        actions: Vec<Action>,
    ) -> Self {
        Self {
            event: event.into(),
            target: target.into(),
            guard,
            actions,
        }
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn guard(&self) -> Option<&Guard> {
        self.guard.as_ref()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Check if this transition can fire for `event` (pure).
    pub fn can_fire(&self, event: &str, extent: &Extent<'_>) -> Result<bool, EvaluationError> {
        if event != self.event {
            return Ok(false);
        }
        self.guard
            .as_ref()
            .map_or(Ok(true), |guard| guard.evaluate(extent))
    }

    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_transition(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Context, InMemoryContext, Scope};
    use crate::expr::{Expr, Value};

    #[test]
    fn can_fire_matches_event() {
        let transition = Transition::new("go", "next", None, Vec::new());
        let mut context = InMemoryContext::new(Scope::Local);
        let extent = Extent::new(&mut context);

        assert!(transition.can_fire("go", &extent).unwrap());
        assert!(!transition.can_fire("stop", &extent).unwrap());
    }

    #[test]
    fn can_fire_respects_guard() {
        let guard = Guard::new(None, Expr::variable("ready"));
        let transition = Transition::new("go", "next", Some(guard), Vec::new());

        let mut context = InMemoryContext::new(Scope::Local);
        context.create("ready", Value::Bool(false)).unwrap();
        assert!(!transition
            .can_fire("go", &Extent::new(&mut context))
            .unwrap());

        context.assign("ready", Value::Bool(true)).unwrap();
        assert!(transition
            .can_fire("go", &Extent::new(&mut context))
            .unwrap());
    }
}
