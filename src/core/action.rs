//! Resolved actions and their execution against an extent.

use crate::context::{Context, ContextError, ContextVariable, Extent, InMemoryContext, Scope};
use crate::core::visitor::Visitor;
use crate::decl::{ActionDecl, ActionKind};
use crate::expr::{EvaluationError, Value};
use std::collections::HashSet;

/// An executable action.
///
/// Named actions come from a state machine's merged action table; inline
/// actions carry no name and exist only where they were declared.
#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    name: Option<String>,
    kind: ActionKind,
}

/// The observable effect of executing an action.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionOutcome {
    /// An existing variable was overwritten
    Assigned { variable: String, value: Value },
    /// A variable was created in the innermost scope
    Created { variable: String, value: Value },
    Deleted { variable: String },
    /// An event was raised for the execution engine to dispatch
    Raised(Event),
}

/// An event raised by an action.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub name: String,
    pub data: Vec<ContextVariable>,
}

impl Event {
    /// Event data as a context, for use as the innermost scope while the
    /// event is handled.
    ///
    /// Fails with [`ContextError::VariableExists`] if two data fields share
    /// a name.
    pub fn data_context(&self) -> Result<InMemoryContext, ContextError> {
        let mut context = InMemoryContext::new(Scope::EventData);
        for variable in &self.data {
            context.create(&variable.name, variable.value.clone())?;
        }
        Ok(context)
    }
}

impl Action {
    pub fn new(name: Option<String>, kind: ActionKind) -> Self {
        Self { name, kind }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_inline(&self) -> bool {
        self.name.is_none()
    }

    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    /// Name of the event this action raises, if any.
    pub fn raised_event(&self) -> Option<&str> {
        match &self.kind {
            ActionKind::Raise { event, .. } => Some(event),
            _ => None,
        }
    }

    /// Execute the action.
    ///
    /// Value expressions are evaluated before any variable is touched, so a
    /// failing action leaves every scope of the extent as it was.
    pub fn execute(&self, extent: &mut Extent<'_>) -> Result<ActionOutcome, EvaluationError> {
        match &self.kind {
            ActionKind::Assign { variable, value } => {
                let value = value.evaluate(extent)?;
                let created = extent.set(variable, value.clone())?;
                let variable = variable.clone();
                Ok(if created {
                    ActionOutcome::Created { variable, value }
                } else {
                    ActionOutcome::Assigned { variable, value }
                })
            }
            ActionKind::Create { variable, value } => {
                let value = value.evaluate(extent)?;
                extent.create(variable, value.clone())?;
                Ok(ActionOutcome::Created {
                    variable: variable.clone(),
                    value,
                })
            }
            ActionKind::Delete { variable } => {
                extent.delete(variable)?;
                Ok(ActionOutcome::Deleted {
                    variable: variable.clone(),
                })
            }
            ActionKind::Raise { event, data } => {
                let mut fields = HashSet::new();
                if let Some(repeated) = data.iter().find(|field| !fields.insert(&field.name)) {
                    return Err(ContextError::VariableExists {
                        name: repeated.name.clone(),
                        scope: Scope::EventData,
                    }
                    .into());
                }

                let data = data
                    .iter()
                    .map(|field| -> Result<ContextVariable, EvaluationError> {
                        let value = field.value.evaluate(extent)?;
                        Ok(ContextVariable::new(
                            field.name.clone(),
                            value,
                            Scope::EventData,
                        ))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ActionOutcome::Raised(Event {
                    name: event.clone(),
                    data,
                }))
            }
        }
    }

    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_action(self);
    }
}

impl From<&ActionDecl> for Action {
    fn from(decl: &ActionDecl) -> Self {
        Self::new(decl.name.clone(), decl.kind.clone())
    }
}
