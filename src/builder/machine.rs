//! Builder for resolved collaborative state machines.

use crate::builder::error::{Message, VerificationError};
use crate::builder::merge::{ancestor_chain, merge, Candidate};
use crate::builder::options::BuildOptions;
use crate::builder::verify::{index_state_machines, verify};
use crate::core::{
    Action, CollaborativeStateMachine, Guard, ResolvedState, ResolvedStateMachine, Transition,
};
use crate::decl::{ActionRefDecl, CollaborativeStateMachineDecl, GuardRefDecl};
use indexmap::{IndexMap, IndexSet};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::{debug, warn};

/// Resolves and verifies a collaborative state machine declaration.
///
/// `build` fails on the first violation under the fixed checking order and
/// never exposes a partially resolved graph. `diagnose` runs the same
/// checks and accumulates every violation instead.
///
/// # Example
///
/// ```
/// use ensemble::builder::CollaborativeStateMachineBuilder;
/// use ensemble::decl::{
///     CollaborativeStateMachineDecl, StateDecl, StateMachineDecl, TransitionDecl,
/// };
///
/// let decl = CollaborativeStateMachineDecl::new("csm").with_state_machine(
///     StateMachineDecl::new("sm")
///         .with_state(StateDecl::new("idle").on(TransitionDecl::new("start", "busy")))
///         .with_state(StateDecl::new("busy").on(TransitionDecl::new("stop", "idle"))),
/// );
///
/// let csm = CollaborativeStateMachineBuilder::new(&decl).build().unwrap();
/// let sm = csm.state_machine_by_name("sm").unwrap();
/// assert_eq!(sm.input_events(), ["start", "stop"]);
/// ```
#[derive(Clone, Debug)]
pub struct CollaborativeStateMachineBuilder<'d> {
    decl: &'d CollaborativeStateMachineDecl,
    options: BuildOptions,
}

struct Resolution<'d> {
    candidates: Vec<Candidate<'d>>,
    violations: Vec<VerificationError>,
}

impl<'d> CollaborativeStateMachineBuilder<'d> {
    pub fn new(decl: &'d CollaborativeStateMachineDecl) -> Self {
        Self {
            decl,
            options: BuildOptions::default(),
        }
    }

    pub fn options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve and verify, returning the first violation on failure.
    pub fn build(&self) -> Result<CollaborativeStateMachine, VerificationError> {
        let resolution = self.resolve();
        if let Some(error) = resolution.violations.into_iter().next() {
            warn!(
                csm = %self.decl.name,
                kind = ?error.message,
                state_machine = %error.state_machine,
                subject = ?error.subject,
                "verification failed"
            );
            return Err(error);
        }

        let mut state_machines = IndexMap::new();
        for candidate in &resolution.candidates {
            let resolved = finalize(candidate)?;
            debug!(
                state_machine = %resolved.name(),
                ancestors = ?resolved.ancestors(),
                states = resolved.state_count(),
                events = resolved.input_events().len(),
                "state machine resolved"
            );
            state_machines.insert(resolved.name().to_string(), resolved);
        }

        debug!(
            csm = %self.decl.name,
            state_machines = state_machines.len(),
            "collaborative state machine built"
        );
        Ok(CollaborativeStateMachine {
            name: self.decl.name.clone(),
            state_machines,
        })
    }

    /// Run every check and accumulate all violations, in checking order.
    pub fn diagnose(&self) -> Validation<(), NonEmptyVec<VerificationError>> {
        let checks: Vec<Validation<(), NonEmptyVec<VerificationError>>> = self
            .resolve()
            .violations
            .into_iter()
            .map(Validation::fail)
            .collect();

        if checks.is_empty() {
            Validation::success(())
        } else {
            Validation::all_vec(checks).map(|_| ())
        }
    }

    fn resolve(&self) -> Resolution<'d> {
        let (index, mut violations) = index_state_machines(self.decl);

        let mut candidates = Vec::with_capacity(index.len());
        for decl in index.values().copied() {
            match ancestor_chain(decl, &index, &self.options) {
                Ok(ancestors) => candidates.push(merge(decl, &ancestors, &self.options)),
                Err(error) => violations.push(error),
            }
        }

        violations.extend(verify(&candidates));
        Resolution {
            candidates,
            violations,
        }
    }
}

/// Turn a verified candidate into its resolved form.
fn finalize(candidate: &Candidate<'_>) -> Result<ResolvedStateMachine, VerificationError> {
    let name = candidate.name();

    let actions: IndexMap<String, Action> = candidate
        .actions
        .iter()
        .map(|(k, v)| (k.to_string(), Action::from(*v)))
        .collect();
    let guards: IndexMap<String, Guard> = candidate
        .guards
        .iter()
        .map(|(k, v)| (k.to_string(), Guard::from(*v)))
        .collect();

    let resolve_action = |reference: &ActionRefDecl| -> Result<Action, VerificationError> {
        match reference {
            ActionRefDecl::Inline(decl) => Ok(Action::from(decl)),
            ActionRefDecl::Reference(action) => actions.get(action).cloned().ok_or_else(|| {
                VerificationError::new(Message::UnknownActionReference, name)
                    .with_subject(action.as_str())
            }),
        }
    };
    let resolve_guard = |reference: &GuardRefDecl| -> Result<Guard, VerificationError> {
        match reference {
            GuardRefDecl::Inline(decl) => Ok(Guard::from(decl)),
            GuardRefDecl::Reference(guard) => guards.get(guard).cloned().ok_or_else(|| {
                VerificationError::new(Message::UnknownGuardReference, name)
                    .with_subject(guard.as_str())
            }),
        }
    };

    let mut states = IndexMap::new();
    for (state_name, merged) in &candidate.states {
        let decl = merged.decl;
        let entry = decl
            .entry
            .iter()
            .map(resolve_action)
            .collect::<Result<Vec<_>, _>>()?;
        let exit = decl
            .exit
            .iter()
            .map(resolve_action)
            .collect::<Result<Vec<_>, _>>()?;
        let mut transitions = Vec::with_capacity(decl.transitions.len());
        for transition in &decl.transitions {
            let guard = transition.guard.as_ref().map(resolve_guard).transpose()?;
            let actions = transition
                .actions
                .iter()
                .map(resolve_action)
                .collect::<Result<Vec<_>, _>>()?;
            transitions.push(Transition::new(
                transition.event.as_str(),
                transition.target.as_str(),
                guard,
                actions,
            ));
        }

        let state = ResolvedState::new(
            state_name.to_string(),
            decl.is_virtual,
            decl.is_abstract,
            merged.declared_in.to_string(),
        )
        .with_behavior(entry, exit, transitions);
        states.insert(state_name.to_string(), state);
    }

    let input_events = candidate
        .input_events()
        .into_iter()
        .map(str::to_string)
        .collect();
    let output_events: IndexSet<String> = states
        .values()
        .flat_map(ResolvedState::actions)
        .filter_map(Action::raised_event)
        .map(str::to_string)
        .collect();

    Ok(ResolvedStateMachine {
        name: name.to_string(),
        is_abstract: candidate.is_abstract(),
        ancestors: candidate.ancestors.iter().map(|a| a.to_string()).collect(),
        states,
        actions,
        guards,
        local_context: candidate
            .local_context
            .iter()
            .map(|(k, v)| (k.to_string(), (*v).clone()))
            .collect(),
        persistent_context: candidate
            .persistent_context
            .iter()
            .map(|(k, v)| (k.to_string(), (*v).clone()))
            .collect(),
        input_events,
        output_events: output_events.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{ActionDecl, StateDecl, StateMachineDecl, TransitionDecl};

    fn ping_pong() -> CollaborativeStateMachineDecl {
        CollaborativeStateMachineDecl::new("csm")
            .with_state_machine(
                StateMachineDecl::new("ping").with_state(
                    StateDecl::new("s")
                        .on(TransitionDecl::new("pong", "s").then(ActionDecl::raise("ping"))),
                ),
            )
            .with_state_machine(
                StateMachineDecl::new("pong").with_state(
                    StateDecl::new("s")
                        .on(TransitionDecl::new("ping", "s").then(ActionDecl::raise("pong"))),
                ),
            )
    }

    #[test]
    fn build_resolves_every_machine() {
        let decl = ping_pong();
        let csm = CollaborativeStateMachineBuilder::new(&decl).build().unwrap();

        assert_eq!(csm.name(), "csm");
        assert_eq!(csm.len(), 2);
        let ping = csm.state_machine_by_name("ping").unwrap();
        assert_eq!(ping.input_events(), ["pong"]);
        assert_eq!(ping.output_events(), ["ping"]);
    }

    #[test]
    fn build_reports_first_violation() {
        let decl = CollaborativeStateMachineDecl::new("csm")
            .with_state_machine(
                StateMachineDecl::new("a")
                    .with_state(StateDecl::new("s").on(TransitionDecl::new("e", "nowhere"))),
            )
            .with_state_machine(StateMachineDecl::new("b").extending("missing"));

        let error = CollaborativeStateMachineBuilder::new(&decl)
            .build()
            .unwrap_err();
        assert_eq!(error.message, Message::StateMachineInheritsFromInvalid);
        assert_eq!(error.state_machine, "b");
    }

    #[test]
    fn diagnose_accumulates_all_violations() {
        let decl = CollaborativeStateMachineDecl::new("csm")
            .with_state_machine(
                StateMachineDecl::new("a")
                    .with_state(StateDecl::new("s").on(TransitionDecl::new("e", "nowhere"))),
            )
            .with_state_machine(StateMachineDecl::new("b").extending("missing"))
            .with_state_machine(StateMachineDecl::new("a"));

        match CollaborativeStateMachineBuilder::new(&decl).diagnose() {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 3);
                let kinds: Vec<_> = errors.iter().map(|e| e.message).collect();
                assert_eq!(
                    kinds,
                    vec![
                        Message::StateMachineNameDuplicate,
                        Message::StateMachineInheritsFromInvalid,
                        Message::TransitionTargetInvalid,
                    ]
                );
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn diagnose_succeeds_on_valid_model() {
        let decl = ping_pong();
        assert!(CollaborativeStateMachineBuilder::new(&decl)
            .diagnose()
            .is_success());
    }
}
