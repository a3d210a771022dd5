//! In-memory context.

use super::{Context, ContextError, ContextSnapshot, ContextVariable, Scope};
use crate::expr::Value;
use indexmap::IndexMap;

/// A context that keeps its variables in memory, in creation order.
#[derive(Clone, Debug, PartialEq)]
pub struct InMemoryContext {
    scope: Scope,
    variables: IndexMap<String, Value>,
}

impl InMemoryContext {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            variables: IndexMap::new(),
        }
    }

    /// Rebuild a context from a snapshot.
    ///
    /// Duplicate names in the snapshot are rejected.
    pub fn from_snapshot(snapshot: &ContextSnapshot) -> Result<Self, ContextError> {
        let mut context = Self::new(snapshot.scope);
        for variable in &snapshot.variables {
            context.create(&variable.name, variable.value.clone())?;
        }
        Ok(context)
    }

    /// Capture the current variables in a snapshot.
    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot::new(self.scope, self.variables())
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    fn variables(&self) -> Vec<ContextVariable> {
        self.variables
            .iter()
            .map(|(name, value)| ContextVariable::new(name.clone(), value.clone(), self.scope))
            .collect()
    }
}

impl Context for InMemoryContext {
    fn scope(&self) -> Scope {
        self.scope
    }

    fn get(&self, name: &str) -> Result<Value, ContextError> {
        self.variables
            .get(name)
            .cloned()
            .ok_or_else(|| ContextError::unknown(name))
    }

    fn create(&mut self, name: &str, value: Value) -> Result<(), ContextError> {
        if self.variables.contains_key(name) {
            return Err(ContextError::VariableExists {
                name: name.to_string(),
                scope: self.scope,
            });
        }
        self.variables.insert(name.to_string(), value);
        Ok(())
    }

    fn assign(&mut self, name: &str, value: Value) -> Result<(), ContextError> {
        let slot = self
            .variables
            .get_mut(name)
            .ok_or_else(|| ContextError::unknown(name))?;
        *slot = value;
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<(), ContextError> {
        self.variables
            .shift_remove(name)
            .map(|_| ())
            .ok_or_else(|| ContextError::unknown(name))
    }

    fn get_all(&self) -> Result<Vec<ContextVariable>, ContextError> {
        Ok(self.variables())
    }

    fn contains(&self, name: &str) -> Result<bool, ContextError> {
        Ok(self.variables.contains_key(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_rejects_existing_name() {
        let mut context = InMemoryContext::new(Scope::Local);
        context.create("x", Value::Integer(1)).unwrap();

        let err = context.create("x", Value::Integer(2)).unwrap_err();
        assert_eq!(
            err,
            ContextError::VariableExists {
                name: "x".to_string(),
                scope: Scope::Local,
            }
        );
        assert_eq!(context.get("x").unwrap(), Value::Integer(1));
    }

    #[test]
    fn assign_and_delete_require_existing_name() {
        let mut context = InMemoryContext::new(Scope::Local);

        assert!(matches!(
            context.assign("y", Value::Null),
            Err(ContextError::UnknownVariable { .. })
        ));
        assert!(matches!(
            context.delete("y"),
            Err(ContextError::UnknownVariable { .. })
        ));
        assert!(context.is_empty());
    }

    #[test]
    fn delete_preserves_creation_order() {
        let mut context = InMemoryContext::new(Scope::Persistent);
        for name in ["a", "b", "c"] {
            context.create(name, Value::from(name)).unwrap();
        }
        context.delete("b").unwrap();

        let names: Vec<_> = context
            .get_all()
            .unwrap()
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn variables_carry_scope_tag() {
        let mut context = InMemoryContext::new(Scope::Static);
        context.create("ratio", Value::Float(2.5)).unwrap();

        let all = context.get_all().unwrap();
        assert_eq!(all, vec![ContextVariable::new("ratio", 2.5, Scope::Static)]);
    }

    #[test]
    fn snapshot_restores_variables() {
        let mut context = InMemoryContext::new(Scope::Local);
        context.create("n", Value::Integer(5)).unwrap();
        context.create("s", Value::from("hi")).unwrap();

        let restored = InMemoryContext::from_snapshot(&context.snapshot()).unwrap();
        assert_eq!(restored, context);
    }
}
