//! Context error types.

use super::Scope;
use thiserror::Error;

/// Errors raised by context and extent operations.
///
/// These are recoverable: the context is left exactly as it was before the
/// failing operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("Context variable '{name}' does not exist")]
    UnknownVariable { name: String },

    #[error("Context variable '{name}' already exists in the {scope} scope")]
    VariableExists { name: String, scope: Scope },

    #[error("Cannot create '{name}': the extent has no scopes")]
    EmptyExtent { name: String },

    #[error("Context storage failed: {0}")]
    Storage(String),
}

impl ContextError {
    pub(crate) fn unknown(name: &str) -> Self {
        Self::UnknownVariable {
            name: name.to_string(),
        }
    }
}
