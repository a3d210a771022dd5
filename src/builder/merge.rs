//! Inheritance resolution.
//!
//! Inheritance is resolved as a plain data pass: the ancestor chain of a
//! declaration is computed first, then the declarations along that chain
//! are folded root-to-leaf into name-keyed tables. Tables are `IndexMap`s, so
//! an override replaces its ancestor entry in place and entries new to a
//! descendant are appended. The result is a `Candidate`, which is verified
//! before it is turned into a `ResolvedStateMachine`.

use crate::builder::error::{Message, VerificationError};
use crate::builder::options::BuildOptions;
use crate::decl::{ActionDecl, GuardDecl, StateDecl, StateMachineDecl};
use crate::expr::Expr;
use indexmap::{IndexMap, IndexSet};
use tracing::trace;

/// A state of the merged table and the machine whose declaration it is.
#[derive(Clone, Copy, Debug)]
pub(crate) struct MergedState<'d> {
    pub decl: &'d StateDecl,
    pub declared_in: &'d str,
}

/// An override the merge refused to apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RejectedOverride {
    pub state: String,
    pub ancestor: String,
}

/// An unverified merge result.
#[derive(Debug)]
pub(crate) struct Candidate<'d> {
    pub decl: &'d StateMachineDecl,
    /// Nearest first
    pub ancestors: Vec<&'d str>,
    pub states: IndexMap<&'d str, MergedState<'d>>,
    pub actions: IndexMap<&'d str, &'d ActionDecl>,
    pub guards: IndexMap<&'d str, &'d GuardDecl>,
    pub local_context: IndexMap<&'d str, &'d Expr>,
    pub persistent_context: IndexMap<&'d str, &'d Expr>,
    /// Overrides attempted by this machine's own declaration
    pub rejected: Vec<RejectedOverride>,
}

impl<'d> Candidate<'d> {
    pub fn name(&self) -> &'d str {
        &self.decl.name
    }

    pub fn is_abstract(&self) -> bool {
        self.decl.is_abstract
    }

    /// Distinct triggering events of the merged state table, first seen first.
    pub fn input_events(&self) -> IndexSet<&'d str> {
        self.states
            .values()
            .flat_map(|state| state.decl.transitions.iter())
            .map(|transition| transition.event.as_str())
            .collect()
    }
}

/// Follow `extends` references from `decl`, returning its ancestors
/// nearest first.
pub(crate) fn ancestor_chain<'d>(
    decl: &'d StateMachineDecl,
    index: &IndexMap<&'d str, &'d StateMachineDecl>,
    options: &BuildOptions,
) -> Result<Vec<&'d StateMachineDecl>, VerificationError> {
    let invalid = |parent: &str| {
        VerificationError::new(Message::StateMachineInheritsFromInvalid, decl.name.as_str())
            .with_subject(parent)
    };

    let mut chain: Vec<&'d StateMachineDecl> = Vec::new();
    let mut seen: IndexSet<&str> = IndexSet::new();
    seen.insert(decl.name.as_str());

    let mut current = decl;
    while let Some(parent) = current.extends.as_deref() {
        let next = index.get(parent).copied().ok_or_else(|| invalid(parent))?;
        if !seen.insert(parent) {
            trace!(state_machine = %decl.name, parent, "inheritance cycle");
            return Err(invalid(parent));
        }
        if chain.len() >= options.max_inheritance_depth {
            trace!(
                state_machine = %decl.name,
                depth = chain.len() + 1,
                "inheritance chain exceeds the configured depth"
            );
            return Err(invalid(parent));
        }
        chain.push(next);
        current = next;
    }
    Ok(chain)
}

/// Fold the lineage of `decl` into a candidate.
pub(crate) fn merge<'d>(
    decl: &'d StateMachineDecl,
    ancestors: &[&'d StateMachineDecl],
    options: &BuildOptions,
) -> Candidate<'d> {
    let mut candidate = Candidate {
        decl,
        ancestors: ancestors.iter().map(|a| a.name.as_str()).collect(),
        states: IndexMap::new(),
        actions: IndexMap::new(),
        guards: IndexMap::new(),
        local_context: IndexMap::new(),
        persistent_context: IndexMap::new(),
        rejected: Vec::new(),
    };

    for machine in ancestors.iter().rev().copied().chain(std::iter::once(decl)) {
        merge_states(&mut candidate, machine, options);

        for action in &machine.actions {
            if let Some(name) = action.name.as_deref() {
                candidate.actions.insert(name, action);
            }
        }
        for guard in &machine.guards {
            if let Some(name) = guard.name.as_deref() {
                candidate.guards.insert(name, guard);
            }
        }
        for variable in machine.local_context.iter().flat_map(|c| &c.variables) {
            candidate
                .local_context
                .insert(variable.name.as_str(), &variable.value);
        }
        for variable in machine.persistent_context.iter().flat_map(|c| &c.variables) {
            candidate
                .persistent_context
                .insert(variable.name.as_str(), &variable.value);
        }
    }

    candidate
}

fn merge_states<'d>(
    candidate: &mut Candidate<'d>,
    machine: &'d StateMachineDecl,
    options: &BuildOptions,
) {
    let own = machine.name == candidate.decl.name;

    for state in &machine.states {
        let incoming = MergedState {
            decl: state,
            declared_in: machine.name.as_str(),
        };
        match candidate.states.get_mut(state.name.as_str()) {
            None => {
                trace!(state_machine = %machine.name, state = %state.name, "state added");
                candidate.states.insert(state.name.as_str(), incoming);
            }
            Some(existing) if overridable(existing.decl, options) => {
                trace!(
                    state_machine = %machine.name,
                    state = %state.name,
                    ancestor = existing.declared_in,
                    "state overridden"
                );
                *existing = incoming;
            }
            Some(existing) => {
                trace!(
                    state_machine = %machine.name,
                    state = %state.name,
                    ancestor = existing.declared_in,
                    "override rejected"
                );
                if own {
                    candidate.rejected.push(RejectedOverride {
                        state: state.name.clone(),
                        ancestor: existing.declared_in.to_string(),
                    });
                }
            }
        }
    }
}

fn overridable(state: &StateDecl, options: &BuildOptions) -> bool {
    state.is_virtual || (options.abstract_states_overridable && state.is_abstract)
}
