//! Expression payloads for actions, guards and context initializers.
//!
//! Expressions are evaluated against an [`Extent`]. Evaluation only reads
//! variables; it never retains the extent past the call and never mutates it.

mod value;

pub use value::Value;

use crate::context::{ContextError, Extent};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while evaluating an expression or executing an action.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("Type mismatch in '{op}': expected {expected}, found {found}")]
    TypeMismatch {
        op: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Arithmetic overflow in '{op}'")]
    Overflow { op: BinaryOp },
}

/// Binary operators understood by [`Expr`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::And => "&&",
            Self::Or => "||",
        };
        write!(f, "{symbol}")
    }
}

/// Expression tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Literal(Value),
    Variable(String),
    Not(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    pub fn negate(expr: Expr) -> Self {
        Self::Not(Box::new(expr))
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Evaluate the expression against an extent.
    ///
    /// `&&` and `||` short-circuit: the right operand is not evaluated
    /// when the left one decides the result.
    pub fn evaluate(&self, extent: &Extent<'_>) -> Result<Value, EvaluationError> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Variable(name) => Ok(extent.get(name)?),
            Self::Not(inner) => {
                let value = inner.evaluate(extent)?;
                let b = expect_bool("!", &value)?;
                Ok(Value::Bool(!b))
            }
            Self::Binary { op, left, right } => {
                let lhs = left.evaluate(extent)?;
                match op {
                    BinaryOp::And => {
                        if !expect_bool("&&", &lhs)? {
                            return Ok(Value::Bool(false));
                        }
                        let rhs = right.evaluate(extent)?;
                        Ok(Value::Bool(expect_bool("&&", &rhs)?))
                    }
                    BinaryOp::Or => {
                        if expect_bool("||", &lhs)? {
                            return Ok(Value::Bool(true));
                        }
                        let rhs = right.evaluate(extent)?;
                        Ok(Value::Bool(expect_bool("||", &rhs)?))
                    }
                    BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => {
                        let rhs = right.evaluate(extent)?;
                        arithmetic(*op, &lhs, &rhs)
                    }
                    BinaryOp::Eq => {
                        let rhs = right.evaluate(extent)?;
                        Ok(Value::Bool(loosely_equal(&lhs, &rhs)))
                    }
                    BinaryOp::Ne => {
                        let rhs = right.evaluate(extent)?;
                        Ok(Value::Bool(!loosely_equal(&lhs, &rhs)))
                    }
                    BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                        let rhs = right.evaluate(extent)?;
                        compare(*op, &lhs, &rhs)
                    }
                }
            }
        }
    }
}

fn expect_bool(op: &str, value: &Value) -> Result<bool, EvaluationError> {
    value.as_bool().ok_or_else(|| EvaluationError::TypeMismatch {
        op: op.to_string(),
        expected: "bool",
        found: value.type_name(),
    })
}

fn mismatch(op: BinaryOp, expected: &'static str, found: &Value) -> EvaluationError {
    EvaluationError::TypeMismatch {
        op: op.to_string(),
        expected,
        found: found.type_name(),
    }
}

fn arithmetic(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, EvaluationError> {
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => {
            let result = match op {
                BinaryOp::Add => a.checked_add(*b),
                BinaryOp::Sub => a.checked_sub(*b),
                _ => a.checked_mul(*b),
            };
            result
                .map(Value::Integer)
                .ok_or(EvaluationError::Overflow { op })
        }
        (Value::String(a), Value::String(b)) if op == BinaryOp::Add => {
            Ok(Value::String(format!("{a}{b}")))
        }
        _ => {
            let a = lhs.as_float().ok_or_else(|| mismatch(op, "number", lhs))?;
            let b = rhs.as_float().ok_or_else(|| mismatch(op, "number", rhs))?;
            let result = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                _ => a * b,
            };
            Ok(Value::Float(result))
        }
    }
}

fn loosely_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs.as_float(), rhs.as_float()) {
        (Some(a), Some(b)) if lhs.is_numeric() && rhs.is_numeric() => a == b,
        _ => lhs == rhs,
    }
}

fn compare(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, EvaluationError> {
    let ordering = match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => a.partial_cmp(b),
        _ => {
            let a = lhs.as_float().ok_or_else(|| mismatch(op, "number", lhs))?;
            let b = rhs.as_float().ok_or_else(|| mismatch(op, "number", rhs))?;
            a.partial_cmp(&b)
        }
    };

    // NaN compares false under every ordering operator
    let Some(ordering) = ordering else {
        return Ok(Value::Bool(false));
    };

    let result = match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Le => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        _ => ordering.is_ge(),
    };
    Ok(Value::Bool(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Context, InMemoryContext, Scope};

    fn context_with(vars: &[(&str, Value)]) -> InMemoryContext {
        let mut context = InMemoryContext::new(Scope::Local);
        for (name, value) in vars {
            context.create(name, value.clone()).unwrap();
        }
        context
    }

    #[test]
    fn evaluates_arithmetic_over_variables() {
        let mut context = context_with(&[("x", Value::Integer(4))]);
        let extent = Extent::new(&mut context);

        let expr = Expr::binary(BinaryOp::Mul, Expr::variable("x"), Expr::literal(3i64));
        assert_eq!(expr.evaluate(&extent).unwrap(), Value::Integer(12));

        let mixed = Expr::binary(BinaryOp::Add, Expr::variable("x"), Expr::literal(0.5));
        assert_eq!(mixed.evaluate(&extent).unwrap(), Value::Float(4.5));
    }

    #[test]
    fn unknown_variable_surfaces_context_error() {
        let mut context = context_with(&[]);
        let extent = Extent::new(&mut context);

        let err = Expr::variable("missing").evaluate(&extent).unwrap_err();
        assert!(matches!(
            err,
            EvaluationError::Context(ContextError::UnknownVariable { .. })
        ));
    }

    #[test]
    fn logical_operators_short_circuit() {
        let mut context = context_with(&[]);
        let extent = Extent::new(&mut context);

        // right side would fail with an unknown variable if evaluated
        let and = Expr::binary(
            BinaryOp::And,
            Expr::literal(false),
            Expr::variable("missing"),
        );
        assert_eq!(and.evaluate(&extent).unwrap(), Value::Bool(false));

        let or = Expr::binary(BinaryOp::Or, Expr::literal(true), Expr::variable("missing"));
        assert_eq!(or.evaluate(&extent).unwrap(), Value::Bool(true));
    }

    #[test]
    fn logical_operators_require_bool_operands() {
        let mut context = context_with(&[("n", Value::Integer(1))]);
        let extent = Extent::new(&mut context);

        let and = Expr::binary(BinaryOp::And, Expr::literal(true), Expr::variable("n"));
        assert_eq!(
            and.evaluate(&extent),
            Err(EvaluationError::TypeMismatch {
                op: "&&".to_string(),
                expected: "bool",
                found: "integer",
            })
        );

        let or = Expr::binary(BinaryOp::Or, Expr::variable("n"), Expr::literal(true));
        assert_eq!(
            or.evaluate(&extent),
            Err(EvaluationError::TypeMismatch {
                op: "||".to_string(),
                expected: "bool",
                found: "integer",
            })
        );
    }

    #[test]
    fn comparison_rejects_mismatched_types() {
        let mut context = context_with(&[]);
        let extent = Extent::new(&mut context);

        let expr = Expr::binary(BinaryOp::Lt, Expr::literal("a"), Expr::literal(1i64));
        assert!(matches!(
            expr.evaluate(&extent),
            Err(EvaluationError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn integer_overflow_is_reported() {
        let mut context = context_with(&[]);
        let extent = Extent::new(&mut context);

        let expr = Expr::binary(BinaryOp::Add, Expr::literal(i64::MAX), Expr::literal(1i64));
        assert_eq!(
            expr.evaluate(&extent),
            Err(EvaluationError::Overflow { op: BinaryOp::Add })
        );
    }

    #[test]
    fn numeric_equality_ignores_representation() {
        let mut context = context_with(&[]);
        let extent = Extent::new(&mut context);

        let expr = Expr::binary(BinaryOp::Eq, Expr::literal(2i64), Expr::literal(2.0));
        assert_eq!(expr.evaluate(&extent).unwrap(), Value::Bool(true));
    }

    #[test]
    fn deserializes_from_json() {
        let json = r#"{"binary": {"op": "ge", "left": {"variable": "n"}, "right": {"literal": {"integer": 2}}}}"#;
        let expr: Expr = serde_json::from_str(json).unwrap();
        assert_eq!(
            expr,
            Expr::binary(BinaryOp::Ge, Expr::variable("n"), Expr::literal(2i64))
        );
    }
}
