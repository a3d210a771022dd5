//! Lookup errors on the resolved graph.

use thiserror::Error;

/// A name-indexed lookup on the resolved graph found nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("State machine '{name}' not found")]
    UnknownStateMachine { name: String },

    #[error("Unknown state '{state}' in state machine '{state_machine}'")]
    UnknownState {
        state_machine: String,
        state: String,
    },

    #[error("Unknown action '{action}' in state machine '{state_machine}'")]
    UnknownAction {
        state_machine: String,
        action: String,
    },

    #[error("Unknown guard '{guard}' in state machine '{state_machine}'")]
    UnknownGuard {
        state_machine: String,
        guard: String,
    },
}
