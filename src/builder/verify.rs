//! Verification of merge candidates.
//!
//! Each check returns every violation it finds, ordered by machine
//! declaration order and then merged state order. Checks run in a fixed
//! sequence, so the first violation of the concatenated list is
//! deterministic for a given declaration model.

use crate::builder::error::{Message, VerificationError};
use crate::builder::merge::Candidate;
use crate::decl::{ActionRefDecl, CollaborativeStateMachineDecl, GuardRefDecl, StateMachineDecl};
use indexmap::IndexMap;

/// Index the declared state machines by name. The first declaration of a
/// name is kept; later ones are reported as duplicates.
pub(crate) fn index_state_machines(
    decl: &CollaborativeStateMachineDecl,
) -> (IndexMap<&str, &StateMachineDecl>, Vec<VerificationError>) {
    let mut index: IndexMap<&str, &StateMachineDecl> = IndexMap::new();
    let mut violations = Vec::new();
    for state_machine in &decl.state_machines {
        if index.contains_key(state_machine.name.as_str()) {
            violations.push(VerificationError::new(
                Message::StateMachineNameDuplicate,
                state_machine.name.as_str(),
            ));
        } else {
            index.insert(state_machine.name.as_str(), state_machine);
        }
    }
    (index, violations)
}

/// All checks that run on merge candidates, in checking order.
pub(crate) fn verify(candidates: &[Candidate<'_>]) -> Vec<VerificationError> {
    let checks: [fn(&[Candidate<'_>]) -> Vec<VerificationError>; 6] = [
        unsupported_overrides,
        unresolved_abstract_states,
        own_abstract_states,
        transition_targets,
        guard_references,
        action_references,
    ];
    checks.iter().flat_map(|check| check(candidates)).collect()
}

pub(crate) fn unsupported_overrides(candidates: &[Candidate<'_>]) -> Vec<VerificationError> {
    candidates
        .iter()
        .flat_map(|candidate| {
            candidate.rejected.iter().map(|rejected| {
                VerificationError::new(
                    Message::StateMachineOverridesUnsupportedStates,
                    candidate.name(),
                )
                .with_subject(rejected.state.as_str())
            })
        })
        .collect()
}

/// Abstract states inherited by a concrete machine and never concretized.
pub(crate) fn unresolved_abstract_states(candidates: &[Candidate<'_>]) -> Vec<VerificationError> {
    abstract_states(
        candidates,
        Message::StateMachineDoesNotOverrideAbstractStates,
        |candidate, declared_in| declared_in != candidate.name(),
    )
}

/// Abstract states declared by a concrete machine itself.
pub(crate) fn own_abstract_states(candidates: &[Candidate<'_>]) -> Vec<VerificationError> {
    abstract_states(
        candidates,
        Message::NonAbstractStateMachineHasAbstractStates,
        |candidate, declared_in| declared_in == candidate.name(),
    )
}

fn abstract_states(
    candidates: &[Candidate<'_>],
    message: Message,
    origin: impl Fn(&Candidate<'_>, &str) -> bool,
) -> Vec<VerificationError> {
    let mut violations = Vec::new();
    for candidate in candidates.iter().filter(|c| !c.is_abstract()) {
        for (name, state) in &candidate.states {
            if state.decl.is_abstract && origin(candidate, state.declared_in) {
                violations.push(
                    VerificationError::new(message, candidate.name()).with_subject(*name),
                );
            }
        }
    }
    violations
}

pub(crate) fn transition_targets(candidates: &[Candidate<'_>]) -> Vec<VerificationError> {
    let mut violations = Vec::new();
    for candidate in candidates {
        for state in candidate.states.values() {
            for transition in &state.decl.transitions {
                if !candidate.states.contains_key(transition.target.as_str()) {
                    violations.push(
                        VerificationError::new(Message::TransitionTargetInvalid, candidate.name())
                            .with_subject(transition.target.as_str()),
                    );
                }
            }
        }
    }
    violations
}

pub(crate) fn guard_references(candidates: &[Candidate<'_>]) -> Vec<VerificationError> {
    let mut violations = Vec::new();
    for candidate in candidates {
        let transitions = candidate
            .states
            .values()
            .flat_map(|state| state.decl.transitions.iter());
        for transition in transitions {
            if let Some(GuardRefDecl::Reference(name)) = &transition.guard {
                if !candidate.guards.contains_key(name.as_str()) {
                    violations.push(
                        VerificationError::new(Message::UnknownGuardReference, candidate.name())
                            .with_subject(name.as_str()),
                    );
                }
            }
        }
    }
    violations
}

pub(crate) fn action_references(candidates: &[Candidate<'_>]) -> Vec<VerificationError> {
    let mut violations = Vec::new();
    for candidate in candidates {
        for state in candidate.states.values() {
            let uses = state
                .decl
                .entry
                .iter()
                .chain(state.decl.transitions.iter().flat_map(|t| t.actions.iter()))
                .chain(state.decl.exit.iter());
            for action in uses {
                if let ActionRefDecl::Reference(name) = action {
                    if !candidate.actions.contains_key(name.as_str()) {
                        violations.push(
                            VerificationError::new(
                                Message::UnknownActionReference,
                                candidate.name(),
                            )
                            .with_subject(name.as_str()),
                        );
                    }
                }
            }
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::merge::merge;
    use crate::builder::BuildOptions;
    use crate::decl::{ActionDecl, GuardDecl, StateDecl, TransitionDecl};
    use crate::expr::Expr;

    fn candidate<'d>(
        decl: &'d StateMachineDecl,
        ancestors: &[&'d StateMachineDecl],
    ) -> Candidate<'d> {
        merge(decl, ancestors, &BuildOptions::default())
    }

    fn kinds(violations: &[VerificationError]) -> Vec<Message> {
        violations.iter().map(|v| v.message).collect()
    }

    #[test]
    fn duplicate_names_keep_first_declaration() {
        let decl = CollaborativeStateMachineDecl::new("csm")
            .with_state_machine(StateMachineDecl::new("a").with_state(StateDecl::new("s1")))
            .with_state_machine(StateMachineDecl::new("a"));

        let (index, violations) = index_state_machines(&decl);
        assert_eq!(index.len(), 1);
        assert_eq!(index["a"].states.len(), 1);
        assert_eq!(kinds(&violations), vec![Message::StateMachineNameDuplicate]);
    }

    #[test]
    fn inherited_and_own_abstract_states_are_distinguished() {
        let parent = StateMachineDecl::new("p")
            .as_abstract()
            .with_state(StateDecl::new("s1").as_abstract());
        let child = StateMachineDecl::new("c")
            .extending("p")
            .with_state(StateDecl::new("s2").as_abstract());

        let candidates = vec![candidate(&parent, &[]), candidate(&child, &[&parent])];

        let inherited = unresolved_abstract_states(&candidates);
        assert_eq!(inherited.len(), 1);
        assert_eq!(inherited[0].state_machine, "c");
        assert_eq!(inherited[0].subject(), Some("s1"));

        let own = own_abstract_states(&candidates);
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].subject(), Some("s2"));
    }

    #[test]
    fn abstract_machines_may_keep_abstract_states() {
        let decl = StateMachineDecl::new("p")
            .as_abstract()
            .with_state(StateDecl::new("s1").as_abstract());
        let candidates = vec![candidate(&decl, &[])];
        assert!(verify(&candidates).is_empty());
    }

    #[test]
    fn unknown_targets_and_references_are_reported_in_order() {
        let decl = StateMachineDecl::new("m")
            .with_action(ActionDecl::delete("x").named("known"))
            .with_guard(GuardDecl::new(Expr::literal(true)).named("ok"))
            .with_state(
                StateDecl::new("s1")
                    .on_entry(ActionRefDecl::reference("missing_entry"))
                    .on(
                        TransitionDecl::new("e", "nowhere")
                            .guarded_by(GuardRefDecl::reference("missing_guard"))
                            .then(ActionRefDecl::reference("known")),
                    )
                    .on(TransitionDecl::new("f", "s1").guarded_by(GuardRefDecl::reference("ok"))),
            );
        let candidates = vec![candidate(&decl, &[])];

        let violations = verify(&candidates);
        assert_eq!(
            kinds(&violations),
            vec![
                Message::TransitionTargetInvalid,
                Message::UnknownGuardReference,
                Message::UnknownActionReference,
            ]
        );
        let subjects: Vec<_> = violations.iter().filter_map(|v| v.subject()).collect();
        assert_eq!(subjects, vec!["nowhere", "missing_guard", "missing_entry"]);
    }

    #[test]
    fn inherited_states_resolve_against_descendant_tables() {
        let parent = StateMachineDecl::new("p")
            .as_abstract()
            .with_state(
                StateDecl::new("s1")
                    .on(TransitionDecl::new("e", "s1").then(ActionRefDecl::reference("hook"))),
            );
        let child = StateMachineDecl::new("c")
            .extending("p")
            .with_action(ActionDecl::raise("hooked").named("hook"));

        let parent_only = vec![candidate(&parent, &[])];
        assert_eq!(
            kinds(&action_references(&parent_only)),
            vec![Message::UnknownActionReference]
        );

        let child_only = vec![candidate(&child, &[&parent])];
        assert!(action_references(&child_only).is_empty());
    }
}
