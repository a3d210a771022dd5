//! Guard predicates for controlling transitions.
//!
//! Guards are boolean expressions evaluated against an extent. Evaluation
//! takes a shared borrow of the extent, so a guard cannot mutate any
//! variable: evaluating it twice against the same extent gives the same
//! answer.

use crate::context::Extent;
use crate::core::visitor::Visitor;
use crate::decl::GuardDecl;
use crate::expr::{EvaluationError, Expr};

/// A resolved guard.
#[derive(Clone, Debug, PartialEq)]
pub struct Guard {
    name: Option<String>,
    expression: Expr,
}

impl Guard {
    pub fn new(name: Option<String>, expression: Expr) -> Self {
        Self { name, expression }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn expression(&self) -> &Expr {
        &self.expression
    }

    /// Check if the guard allows the transition.
    ///
    /// Fails if the expression references an unknown variable or does not
    /// produce a boolean.
    pub fn evaluate(&self, extent: &Extent<'_>) -> Result<bool, EvaluationError> {
        let value = self.expression.evaluate(extent)?;
        value.as_bool().ok_or_else(|| EvaluationError::TypeMismatch {
            op: format!("guard {}", self.name().unwrap_or("<inline>")),
            expected: "bool",
            found: value.type_name(),
        })
    }

    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_guard(self);
    }
}

impl From<&GuardDecl> for Guard {
    fn from(decl: &GuardDecl) -> Self {
        Self::new(decl.name.clone(), decl.expression.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Context, InMemoryContext, Scope};
    use crate::expr::{BinaryOp, Value};

    fn counter(n: i64) -> InMemoryContext {
        let mut context = InMemoryContext::new(Scope::Local);
        context.create("n", Value::Integer(n)).unwrap();
        context
    }

    fn below_three() -> Guard {
        Guard::new(
            Some("belowThree".to_string()),
            Expr::binary(BinaryOp::Lt, Expr::variable("n"), Expr::literal(3i64)),
        )
    }

    #[test]
    fn guard_allows_matching_values() {
        let mut low = counter(1);
        assert!(below_three().evaluate(&Extent::new(&mut low)).unwrap());

        let mut high = counter(5);
        assert!(!below_three().evaluate(&Extent::new(&mut high)).unwrap());
    }

    #[test]
    fn guard_is_deterministic() {
        let mut context = counter(2);
        let extent = Extent::new(&mut context);
        let guard = below_three();

        let result1 = guard.evaluate(&extent).unwrap();
        let result2 = guard.evaluate(&extent).unwrap();
        assert_eq!(result1, result2);
    }

    #[test]
    fn non_boolean_guard_is_a_type_mismatch() {
        let mut context = counter(2);
        let guard = Guard::new(None, Expr::variable("n"));

        assert!(matches!(
            guard.evaluate(&Extent::new(&mut context)),
            Err(EvaluationError::TypeMismatch {
                expected: "bool",
                ..
            })
        ));
    }
}
