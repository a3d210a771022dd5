//! Layered variable storage for state machine execution.
//!
//! A [`Context`] is a single named-variable scope. An [`Extent`] stacks
//! several contexts, innermost first, and resolves names through them so
//! that inner declarations shadow outer ones.
//!
//! Contexts are created per execution session. Storage-backed contexts
//! such as [`FileContext`] hold resources that are released when the
//! context is dropped, on every exit path.

mod error;
mod extent;
mod file;
mod memory;
mod snapshot;

pub use error::ContextError;
pub use extent::Extent;
pub use file::FileContext;
pub use memory::InMemoryContext;
pub use snapshot::{ContextSnapshot, SnapshotError, SNAPSHOT_VERSION};

use crate::expr::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The scope a context variable lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Data carried by the event currently being handled
    EventData,
    /// Variables local to one state machine instance
    Local,
    /// Variables shared by the instances of a collaborative state machine
    Persistent,
    /// Process-wide constants
    Static,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EventData => "event data",
            Self::Local => "local",
            Self::Persistent => "persistent",
            Self::Static => "static",
        };
        write!(f, "{name}")
    }
}

/// A variable together with the scope it was read from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContextVariable {
    pub name: String,
    pub value: Value,
    pub scope: Scope,
}

impl ContextVariable {
    pub fn new(name: impl Into<String>, value: impl Into<Value>, scope: Scope) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            scope,
        }
    }
}

/// A single variable scope.
///
/// Every operation either fully applies or leaves the context unchanged.
/// Implementations backed by external storage report storage failures as
/// [`ContextError::Storage`] without touching their in-memory state.
pub trait Context {
    /// Scope tag attached to the variables of this context.
    fn scope(&self) -> Scope;

    /// Read a variable. Fails if the name is absent.
    fn get(&self, name: &str) -> Result<Value, ContextError>;

    /// Create a variable. Fails if the name is already present.
    fn create(&mut self, name: &str, value: Value) -> Result<(), ContextError>;

    /// Overwrite a variable. Fails if the name is absent.
    fn assign(&mut self, name: &str, value: Value) -> Result<(), ContextError>;

    /// Remove a variable. Fails if the name is absent.
    fn delete(&mut self, name: &str) -> Result<(), ContextError>;

    /// All variables, in creation order.
    fn get_all(&self) -> Result<Vec<ContextVariable>, ContextError>;

    /// Check whether a variable exists in this scope.
    fn contains(&self, name: &str) -> Result<bool, ContextError> {
        match self.get(name) {
            Ok(_) => Ok(true),
            Err(ContextError::UnknownVariable { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
