//! Verification errors raised while building a collaborative state machine.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The kind of build-time violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Two state machines share a name
    StateMachineNameDuplicate,

    /// The parent is unknown, the chain is cyclic, or the chain is too deep
    StateMachineInheritsFromInvalid,

    /// A state overrides an ancestor state that may not be overridden
    StateMachineOverridesUnsupportedStates,

    /// An inherited abstract state is left abstract in a concrete machine
    StateMachineDoesNotOverrideAbstractStates,

    /// A concrete machine declares an abstract state of its own
    NonAbstractStateMachineHasAbstractStates,

    TransitionTargetInvalid,

    UnknownActionReference,

    UnknownGuardReference,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::StateMachineNameDuplicate => "Duplicate state machine name",
            Self::StateMachineInheritsFromInvalid => {
                "State machine inherits from an invalid state machine"
            }
            Self::StateMachineOverridesUnsupportedStates => {
                "State machine overrides a state that is neither virtual nor abstract"
            }
            Self::StateMachineDoesNotOverrideAbstractStates => {
                "State machine does not override inherited abstract states"
            }
            Self::NonAbstractStateMachineHasAbstractStates => {
                "Non-abstract state machine declares abstract states"
            }
            Self::TransitionTargetInvalid => "Transition targets an unknown state",
            Self::UnknownActionReference => "Reference to an unknown action",
            Self::UnknownGuardReference => "Reference to an unknown guard",
        };
        f.write_str(text)
    }
}

/// A structured verification failure.
///
/// `subject` names what is implicated inside `state_machine`. For override
/// and abstraction failures it is the state; for reference failures it is
/// the name that could not be resolved (a parent machine, a transition
/// target, an action or a guard). Duplicate machine names carry no subject.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message} in state machine '{state_machine}'{}", describe(.subject))]
pub struct VerificationError {
    pub message: Message,
    pub state_machine: String,
    pub subject: Option<String>,
}

impl VerificationError {
    pub fn new(message: Message, state_machine: impl Into<String>) -> Self {
        Self {
            message,
            state_machine: state_machine.into(),
            subject: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }
}

fn describe(subject: &Option<String>) -> String {
    subject
        .as_ref()
        .map(|s| format!(": '{s}'"))
        .unwrap_or_default()
}
