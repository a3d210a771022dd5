//! Serializable snapshots of a context.
//!
//! Snapshots let persistent contexts survive process restarts. They are
//! plain data: a format version, an identifier, a timestamp, the scope and
//! the variables in creation order.

use super::{Context, ContextError, ContextVariable, Scope};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

/// Version identifier for the snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Why a snapshot could not be written or restored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("Cannot encode {format} context snapshot: {reason}")]
    Encode {
        format: &'static str,
        reason: String,
    },

    #[error("Cannot decode {format} context snapshot: {reason}")]
    Decode {
        format: &'static str,
        reason: String,
    },

    #[error("Context snapshot version {found} is not readable, expected {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// A variable is tagged with a scope other than the snapshot's own.
    #[error("Snapshot variable '{variable}' belongs to the {found} scope, not {expected}")]
    ScopeMismatch {
        variable: String,
        expected: Scope,
        found: Scope,
    },

    #[error("Snapshot declares context variable '{name}' more than once")]
    DuplicateVariable { name: String },
}

impl SnapshotError {
    fn encode(format: &'static str, reason: impl ToString) -> Self {
        Self::Encode {
            format,
            reason: reason.to_string(),
        }
    }

    fn decode(format: &'static str, reason: impl ToString) -> Self {
        Self::Decode {
            format,
            reason: reason.to_string(),
        }
    }
}

/// Serializable copy of a context's variables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: Uuid,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    /// Scope of the captured context
    pub scope: Scope,

    /// Variables in creation order
    pub variables: Vec<ContextVariable>,
}

impl ContextSnapshot {
    pub fn new(scope: Scope, variables: Vec<ContextVariable>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4(),
            taken_at: Utc::now(),
            scope,
            variables,
        }
    }

    /// Capture any context through its public interface.
    pub fn capture(context: &dyn Context) -> Result<Self, ContextError> {
        Ok(Self::new(context.scope(), context.get_all()?))
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotError::encode("JSON", e))
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| SnapshotError::decode("JSON", e))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::encode("binary", e))
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self =
            bincode::deserialize(bytes).map_err(|e| SnapshotError::decode("binary", e))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check version, scope tags and name uniqueness.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }

        let mut names = HashSet::new();
        for variable in &self.variables {
            if variable.scope != self.scope {
                return Err(SnapshotError::ScopeMismatch {
                    variable: variable.name.clone(),
                    expected: self.scope,
                    found: variable.scope,
                });
            }
            if !names.insert(variable.name.as_str()) {
                return Err(SnapshotError::DuplicateVariable {
                    name: variable.name.clone(),
                });
            }
        }
        Ok(())
    }
}
