//! Declaration model.
//!
//! These types are the input of the resolution pipeline: an immutable tree
//! produced by a parser from a textual or serialized description. The
//! pipeline assumes names are unique within a single declaration's own
//! state, action and guard lists.
//!
//! Declarations deserialize from JSON with the documented defaults: absent
//! contexts, empty guard and action lists, `abstract` false and no parent.

use crate::expr::Expr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading a declaration model.
#[derive(Debug, Error)]
pub enum DeclError {
    #[error("Malformed declaration: {0}")]
    Malformed(String),
}

/// Top-level declaration: a named set of state machines.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborativeStateMachineDecl {
    pub name: String,
    #[serde(default)]
    pub state_machines: Vec<StateMachineDecl>,
}

impl CollaborativeStateMachineDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state_machines: Vec::new(),
        }
    }

    pub fn with_state_machine(mut self, state_machine: StateMachineDecl) -> Self {
        self.state_machines.push(state_machine);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, DeclError> {
        serde_json::from_str(json).map_err(|e| DeclError::Malformed(e.to_string()))
    }
}

/// A state machine declaration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateMachineDecl {
    pub name: String,
    pub states: Vec<StateDecl>,
    #[serde(default)]
    pub local_context: Option<ContextDecl>,
    #[serde(default)]
    pub persistent_context: Option<ContextDecl>,
    #[serde(default)]
    pub guards: Vec<GuardDecl>,
    #[serde(default)]
    pub actions: Vec<ActionDecl>,
    /// Name of the state machine this one extends
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
}

impl StateMachineDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn extending(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_state(mut self, state: StateDecl) -> Self {
        self.states.push(state);
        self
    }

    pub fn with_action(mut self, action: ActionDecl) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_guard(mut self, guard: GuardDecl) -> Self {
        self.guards.push(guard);
        self
    }

    pub fn with_local(mut self, name: impl Into<String>, value: Expr) -> Self {
        self.local_context
            .get_or_insert_with(ContextDecl::default)
            .variables
            .push(VariableDecl::new(name, value));
        self
    }

    pub fn with_persistent(mut self, name: impl Into<String>, value: Expr) -> Self {
        self.persistent_context
            .get_or_insert_with(ContextDecl::default)
            .variables
            .push(VariableDecl::new(name, value));
        self
    }
}

/// Lexical declaration of context variables and their initial values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextDecl {
    pub variables: Vec<VariableDecl>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: String,
    pub value: Expr,
}

impl VariableDecl {
    pub fn new(name: impl Into<String>, value: Expr) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A state declaration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDecl {
    pub name: String,
    #[serde(default, rename = "virtual")]
    pub is_virtual: bool,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub entry: Vec<ActionRefDecl>,
    #[serde(default)]
    pub exit: Vec<ActionRefDecl>,
    #[serde(default, rename = "on")]
    pub transitions: Vec<TransitionDecl>,
}

impl StateDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn as_virtual(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn on(mut self, transition: TransitionDecl) -> Self {
        self.transitions.push(transition);
        self
    }

    pub fn on_entry(mut self, action: impl Into<ActionRefDecl>) -> Self {
        self.entry.push(action.into());
        self
    }

    pub fn on_exit(mut self, action: impl Into<ActionRefDecl>) -> Self {
        self.exit.push(action.into());
        self
    }
}

/// A transition fired by `event` towards the state named `target`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionDecl {
    pub event: String,
    pub target: String,
    #[serde(default)]
    pub guard: Option<GuardRefDecl>,
    #[serde(default)]
    pub actions: Vec<ActionRefDecl>,
}

impl TransitionDecl {
    pub fn new(event: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            target: target.into(),
            guard: None,
            actions: Vec::new(),
        }
    }

    pub fn guarded_by(mut self, guard: impl Into<GuardRefDecl>) -> Self {
        self.guard = Some(guard.into());
        self
    }

    pub fn then(mut self, action: impl Into<ActionRefDecl>) -> Self {
        self.actions.push(action.into());
        self
    }
}

/// The behavior of an action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    /// Assign `variable` where visible, else create it in the innermost scope
    Assign { variable: String, value: Expr },
    /// Create `variable` in the innermost scope
    Create { variable: String, value: Expr },
    /// Delete the innermost visible `variable`
    Delete { variable: String },
    /// Raise `event`, carrying the evaluated `data`
    Raise {
        event: String,
        #[serde(default)]
        data: Vec<VariableDecl>,
    },
}

/// An action declaration. Unnamed actions are inline: they cannot be
/// referenced and never take part in inheritance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionDecl {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub kind: ActionKind,
}

impl ActionDecl {
    pub fn new(kind: ActionKind) -> Self {
        Self { name: None, kind }
    }

    pub fn assign(variable: impl Into<String>, value: Expr) -> Self {
        Self::new(ActionKind::Assign {
            variable: variable.into(),
            value,
        })
    }

    pub fn create(variable: impl Into<String>, value: Expr) -> Self {
        Self::new(ActionKind::Create {
            variable: variable.into(),
            value,
        })
    }

    pub fn delete(variable: impl Into<String>) -> Self {
        Self::new(ActionKind::Delete {
            variable: variable.into(),
        })
    }

    pub fn raise(event: impl Into<String>) -> Self {
        Self::new(ActionKind::Raise {
            event: event.into(),
            data: Vec::new(),
        })
    }

    /// Add a data field; only meaningful for raise actions.
    pub fn with_data(mut self, name: impl Into<String>, value: Expr) -> Self {
        if let ActionKind::Raise { data, .. } = &mut self.kind {
            data.push(VariableDecl::new(name, value));
        }
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A guard declaration; unnamed guards are inline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuardDecl {
    #[serde(default)]
    pub name: Option<String>,
    pub expression: Expr,
}

impl GuardDecl {
    pub fn new(expression: Expr) -> Self {
        Self {
            name: None,
            expression,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Use of an action: by name from the machine's action table, or inline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionRefDecl {
    Reference(String),
    Inline(ActionDecl),
}

impl ActionRefDecl {
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Reference(name.into())
    }
}

impl From<ActionDecl> for ActionRefDecl {
    fn from(action: ActionDecl) -> Self {
        Self::Inline(action)
    }
}

/// Use of a guard: by name from the machine's guard table, or inline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GuardRefDecl {
    Reference(String),
    Inline(GuardDecl),
}

impl GuardRefDecl {
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Reference(name.into())
    }
}

impl From<GuardDecl> for GuardRefDecl {
    fn from(guard: GuardDecl) -> Self {
        Self::Inline(guard)
    }
}
