//! Build configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ancestor chains longer than this are rejected as invalid inheritance.
pub const DEFAULT_MAX_INHERITANCE_DEPTH: usize = 64;

/// Options controlling resolution and verification.
///
/// # Example
///
/// ```
/// use ensemble::builder::BuildOptions;
///
/// let options = BuildOptions::from_json(r#"{ "max_inheritance_depth": 8 }"#).unwrap();
/// assert_eq!(options.max_inheritance_depth, 8);
/// assert!(options.abstract_states_overridable);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Maximum number of ancestors a state machine may have
    pub max_inheritance_depth: usize,

    /// Whether an abstract ancestor state may be overridden even when it is
    /// not declared virtual. When false only virtual states are overridable.
    pub abstract_states_overridable: bool,
}

/// Errors raised while reading build options.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("Invalid build options: {0}")]
    Invalid(String),
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_inheritance_depth: DEFAULT_MAX_INHERITANCE_DEPTH,
            abstract_states_overridable: true,
        }
    }
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_inheritance_depth(mut self, depth: usize) -> Self {
        self.max_inheritance_depth = depth;
        self
    }

    pub fn abstract_states_overridable(mut self, overridable: bool) -> Self {
        self.abstract_states_overridable = overridable;
        self
    }

    /// Load options from JSON; absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        serde_json::from_str(json).map_err(|e| OptionsError::Invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = BuildOptions::default();
        assert_eq!(options.max_inheritance_depth, 64);
        assert!(options.abstract_states_overridable);
    }

    #[test]
    fn fluent_setters() {
        let options = BuildOptions::new()
            .max_inheritance_depth(2)
            .abstract_states_overridable(false);
        assert_eq!(options.max_inheritance_depth, 2);
        assert!(!options.abstract_states_overridable);
    }

    #[test]
    fn from_json_rejects_wrong_types() {
        let result = BuildOptions::from_json(r#"{ "max_inheritance_depth": "deep" }"#);
        assert!(matches!(result, Err(OptionsError::Invalid(_))));
    }

    #[test]
    fn from_json_empty_object_is_default() {
        assert_eq!(BuildOptions::from_json("{}").unwrap(), BuildOptions::default());
    }
}
