//! Property-based tests for resolution and the context runtime.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use ensemble::builder::{CollaborativeStateMachineBuilder, Message};
use ensemble::context::{Context, Extent, InMemoryContext, Scope};
use ensemble::core::Guard;
use ensemble::decl::{CollaborativeStateMachineDecl, StateDecl, StateMachineDecl, TransitionDecl};
use ensemble::expr::{BinaryOp, Expr, Value};
use proptest::prelude::*;

/// Per state of the parent: (virtual, abstract, overridden by the child).
type StateFlags = (bool, bool, bool);

prop_compose! {
    fn arbitrary_flags()(
        flags in prop::collection::vec(any::<StateFlags>(), 1..8)
    ) -> Vec<StateFlags> {
        flags
    }
}

prop_compose! {
    fn arbitrary_events()(
        states in prop::collection::vec(prop::collection::vec(0..5u8, 0..4), 1..6)
    ) -> Vec<Vec<u8>> {
        states
    }
}

fn parent_and_child(flags: &[StateFlags]) -> CollaborativeStateMachineDecl {
    let mut parent = StateMachineDecl::new("parent").as_abstract();
    let mut child = StateMachineDecl::new("child").extending("parent");

    for (i, &(is_virtual, is_abstract, overridden)) in flags.iter().enumerate() {
        let mut state = StateDecl::new(format!("s{i}"));
        state.is_virtual = is_virtual;
        state.is_abstract = is_abstract;
        parent = parent.with_state(state);

        if overridden {
            child = child.with_state(StateDecl::new(format!("s{i}")));
        }
    }

    CollaborativeStateMachineDecl::new("csm")
        .with_state_machine(parent)
        .with_state_machine(child)
}

fn with_events(states: &[Vec<u8>]) -> CollaborativeStateMachineDecl {
    let mut machine = StateMachineDecl::new("sm");
    for (i, events) in states.iter().enumerate() {
        let mut state = StateDecl::new(format!("s{i}"));
        for event in events {
            state = state.on(TransitionDecl::new(format!("e{event}"), format!("s{i}")));
        }
        machine = machine.with_state(state);
    }
    CollaborativeStateMachineDecl::new("csm").with_state_machine(machine)
}

proptest! {
    #[test]
    fn inner_scope_shadows_outer(
        inner_value in any::<i64>(),
        outer_value in any::<i64>(),
        update in any::<i64>(),
    ) {
        let mut outer = InMemoryContext::new(Scope::Persistent);
        let mut inner = InMemoryContext::new(Scope::Local);
        outer.create("x", Value::Integer(outer_value)).unwrap();
        inner.create("x", Value::Integer(inner_value)).unwrap();

        {
            let mut extent = Extent::new(&mut inner).enclose(&mut outer);
            prop_assert_eq!(extent.get("x").unwrap(), Value::Integer(inner_value));

            extent.assign("x", Value::Integer(update)).unwrap();
            prop_assert_eq!(extent.get("x").unwrap(), Value::Integer(update));
            prop_assert!(extent.create("x", Value::Null).is_err());
        }

        prop_assert_eq!(inner.get("x").unwrap(), Value::Integer(update));
        prop_assert_eq!(outer.get("x").unwrap(), Value::Integer(outer_value));
    }

    #[test]
    fn build_is_idempotent(flags in arbitrary_flags()) {
        let decl = parent_and_child(&flags);
        let first = CollaborativeStateMachineBuilder::new(&decl).build();
        let second = CollaborativeStateMachineBuilder::new(&decl).build();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn only_virtual_or_abstract_states_are_overridden(flags in arbitrary_flags()) {
        let decl = parent_and_child(&flags);
        let result = CollaborativeStateMachineBuilder::new(&decl).build();

        let illegal_override = flags.iter().position(|&(is_virtual, is_abstract, overridden)| {
            overridden && !is_virtual && !is_abstract
        });
        let unresolved = flags
            .iter()
            .position(|&(_, is_abstract, overridden)| is_abstract && !overridden);

        match (illegal_override, unresolved) {
            (Some(index), _) => {
                let error = result.unwrap_err();
                let expected = format!("s{index}");
                prop_assert_eq!(error.message, Message::StateMachineOverridesUnsupportedStates);
                prop_assert_eq!(error.subject(), Some(expected.as_str()));
            }
            (None, Some(index)) => {
                let error = result.unwrap_err();
                let expected = format!("s{index}");
                prop_assert_eq!(error.message, Message::StateMachineDoesNotOverrideAbstractStates);
                prop_assert_eq!(error.subject(), Some(expected.as_str()));
            }
            (None, None) => {
                let csm = result.unwrap();
                for machine in csm.concrete_state_machines() {
                    prop_assert!(machine.states().all(|state| !state.is_abstract()));
                }
                let child = csm.state_machine_by_name("child").unwrap();
                prop_assert_eq!(child.state_count(), flags.len());
            }
        }
    }

    #[test]
    fn input_events_are_the_ordered_union(states in arbitrary_events()) {
        let decl = with_events(&states);
        let csm = CollaborativeStateMachineBuilder::new(&decl).build().unwrap();
        let machine = csm.state_machine_by_name("sm").unwrap();

        let mut expected: Vec<String> = Vec::new();
        for event in states.iter().flatten() {
            let name = format!("e{event}");
            if !expected.contains(&name) {
                expected.push(name);
            }
        }
        prop_assert_eq!(machine.input_events(), expected.as_slice());
    }

    #[test]
    fn guard_is_deterministic(value in any::<i64>(), limit in any::<i64>()) {
        let guard = Guard::new(
            None,
            Expr::binary(BinaryOp::Lt, Expr::variable("n"), Expr::literal(limit)),
        );
        let mut local = InMemoryContext::new(Scope::Local);
        local.create("n", Value::Integer(value)).unwrap();
        let before = local.clone();

        let extent = Extent::new(&mut local);
        let first = guard.evaluate(&extent).unwrap();
        let second = guard.evaluate(&extent).unwrap();
        drop(extent);

        prop_assert_eq!(first, second);
        prop_assert_eq!(first, value < limit);
        prop_assert_eq!(local, before);
    }
}
