//! Ordered composition of context scopes.

use super::{Context, ContextError, ContextVariable};
use crate::expr::Value;
use std::collections::HashSet;

/// An ordered stack of contexts, innermost first.
///
/// `get`, `assign` and `delete` act on the first scope that contains the
/// name, so an inner variable shadows an outer one of the same name without
/// destroying it. `create` always targets the innermost scope.
///
/// The extent borrows its contexts mutably for its whole lifetime, which
/// serializes mutating access: only one action can hold a given extent.
///
/// # Example
///
/// ```rust
/// use ensemble::context::{Context, Extent, InMemoryContext, Scope};
/// use ensemble::expr::Value;
///
/// let mut persistent = InMemoryContext::new(Scope::Persistent);
/// persistent.create("x", Value::Integer(1)).unwrap();
/// let mut local = InMemoryContext::new(Scope::Local);
/// local.create("x", Value::Integer(2)).unwrap();
///
/// let mut extent = Extent::new(&mut persistent).extend(&mut local);
/// assert_eq!(extent.get("x").unwrap(), Value::Integer(2));
///
/// extent.assign("x", Value::Integer(3)).unwrap();
/// drop(extent);
/// assert_eq!(local.get("x").unwrap(), Value::Integer(3));
/// assert_eq!(persistent.get("x").unwrap(), Value::Integer(1));
/// ```
#[derive(Default)]
pub struct Extent<'a> {
    scopes: Vec<&'a mut dyn Context>,
}

impl<'a> Extent<'a> {
    /// Create an extent with a single scope.
    pub fn new(context: &'a mut dyn Context) -> Self {
        Self {
            scopes: vec![context],
        }
    }

    /// Create an extent from scopes ordered innermost first.
    pub fn from_scopes(scopes: Vec<&'a mut dyn Context>) -> Self {
        Self { scopes }
    }

    /// Add a new innermost scope.
    pub fn extend(mut self, context: &'a mut dyn Context) -> Self {
        self.scopes.insert(0, context);
        self
    }

    /// Add a new outermost scope.
    pub fn enclose(mut self, context: &'a mut dyn Context) -> Self {
        self.scopes.push(context);
        self
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Read the innermost visible variable named `name`.
    pub fn get(&self, name: &str) -> Result<Value, ContextError> {
        for scope in &self.scopes {
            match scope.get(name) {
                Ok(value) => return Ok(value),
                Err(ContextError::UnknownVariable { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(ContextError::unknown(name))
    }

    /// Check whether any scope declares `name`.
    pub fn contains(&self, name: &str) -> Result<bool, ContextError> {
        Ok(self.position(name)?.is_some())
    }

    /// Overwrite the innermost visible variable named `name`.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), ContextError> {
        let index = self
            .position(name)?
            .ok_or_else(|| ContextError::unknown(name))?;
        self.scopes[index].assign(name, value)
    }

    /// Create `name` in the innermost scope.
    pub fn create(&mut self, name: &str, value: Value) -> Result<(), ContextError> {
        let innermost = self
            .scopes
            .first_mut()
            .ok_or_else(|| ContextError::EmptyExtent {
                name: name.to_string(),
            })?;
        innermost.create(name, value)
    }

    /// Delete the innermost visible variable named `name`.
    pub fn delete(&mut self, name: &str) -> Result<(), ContextError> {
        let index = self
            .position(name)?
            .ok_or_else(|| ContextError::unknown(name))?;
        self.scopes[index].delete(name)
    }

    /// Assign `name` where it is visible, otherwise create it in the
    /// innermost scope. Returns `true` when the variable was created.
    pub fn set(&mut self, name: &str, value: Value) -> Result<bool, ContextError> {
        match self.position(name)? {
            Some(index) => {
                self.scopes[index].assign(name, value)?;
                Ok(false)
            }
            None => {
                self.create(name, value)?;
                Ok(true)
            }
        }
    }

    /// The visible variables: for each name, the innermost declaration.
    pub fn get_all(&self) -> Result<Vec<ContextVariable>, ContextError> {
        let mut seen = HashSet::new();
        let mut visible = Vec::new();
        for scope in &self.scopes {
            for variable in scope.get_all()? {
                if seen.insert(variable.name.clone()) {
                    visible.push(variable);
                }
            }
        }
        Ok(visible)
    }

    fn position(&self, name: &str) -> Result<Option<usize>, ContextError> {
        for (index, scope) in self.scopes.iter().enumerate() {
            if scope.contains(name)? {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }
}
