//! Ping Pong
//!
//! This example demonstrates two collaborating state machines that share an
//! abstract ancestor.
//!
//! Key concepts:
//! - An abstract machine declaring a virtual state and an abstract state
//! - Descendants concretizing the abstract state
//! - Collaboration edges derived from raised and handled events
//! - Executing actions and guards against an extent
//!
//! Run with: cargo run --example ping_pong

use ensemble::builder::CollaborativeStateMachineBuilder;
use ensemble::context::{Context, Extent, InMemoryContext};
use ensemble::core::ActionOutcome;
use ensemble::decl::{
    ActionDecl, ActionRefDecl, CollaborativeStateMachineDecl, GuardDecl, GuardRefDecl, StateDecl,
    StateMachineDecl, TransitionDecl,
};
use ensemble::expr::{BinaryOp, Expr};

fn player(name: &str, serves: &str, returns: &str) -> StateMachineDecl {
    StateMachineDecl::new(name).extending("player").with_state(
        StateDecl::new("playing").on(
            TransitionDecl::new(returns, "playing")
                .guarded_by(GuardRefDecl::reference("in_play"))
                .then(ActionRefDecl::reference("count"))
                .then(ActionDecl::raise(serves)),
        ),
    )
}

fn main() {
    println!("=== Ping Pong ===\n");

    let decl = CollaborativeStateMachineDecl::new("table")
        .with_state_machine(
            StateMachineDecl::new("player")
                .as_abstract()
                .with_local("hits", Expr::literal(0i64))
                .with_guard(
                    GuardDecl::new(Expr::binary(
                        BinaryOp::Lt,
                        Expr::variable("hits"),
                        Expr::literal(3i64),
                    ))
                    .named("in_play"),
                )
                .with_action(
                    ActionDecl::assign(
                        "hits",
                        Expr::binary(BinaryOp::Add, Expr::variable("hits"), Expr::literal(1i64)),
                    )
                    .named("count"),
                )
                .with_state(
                    StateDecl::new("waiting")
                        .as_virtual()
                        .on(TransitionDecl::new("start", "playing")),
                )
                .with_state(StateDecl::new("playing").as_abstract()),
        )
        .with_state_machine(player("ping", "ping", "pong"))
        .with_state_machine(player("pong", "pong", "ping"));

    let csm = match CollaborativeStateMachineBuilder::new(&decl).build() {
        Ok(csm) => csm,
        Err(error) => {
            println!("Verification failed: {error}");
            return;
        }
    };

    for machine in csm.concrete_state_machines() {
        println!(
            "{}: extends {:?}, handles {:?}, raises {:?}",
            machine.name(),
            machine.extends(),
            machine.input_events(),
            machine.output_events()
        );
    }
    for collaboration in csm.collaborations() {
        println!(
            "  {} --{}--> {}",
            collaboration.producer, collaboration.event, collaboration.consumer
        );
    }

    // Drive a rally until a guard stops it.
    let ping = csm.state_machine_by_name("ping").expect("ping is declared");
    let pong = csm.state_machine_by_name("pong").expect("pong is declared");
    let mut contexts: Vec<InMemoryContext> = [ping, pong]
        .iter()
        .map(|machine| machine.create_local_context().expect("constant initializers"))
        .collect();

    let mut event = "ping".to_string();
    loop {
        let (index, machine) = if event == "ping" { (1, pong) } else { (0, ping) };
        let state = machine.state_by_name("playing").expect("concretized state");
        let mut extent = Extent::new(&mut contexts[index]);

        let Some(transition) = state.transitions_on(&event).next() else {
            break;
        };
        if !transition.can_fire(&event, &extent).expect("guard evaluates") {
            println!("\n{} lets the ball go", machine.name());
            break;
        }

        let mut raised = None;
        for action in transition.actions() {
            if let ActionOutcome::Raised(next) = action.execute(&mut extent).expect("action runs") {
                raised = Some(next.name);
            }
        }
        println!(
            "{} returns ({} hits)",
            machine.name(),
            extent.get("hits").expect("declared variable")
        );
        match raised {
            Some(next) => event = next,
            None => break,
        }
    }

    println!();
    for (machine, context) in [ping, pong].iter().zip(&contexts) {
        for variable in context.get_all().expect("in-memory contexts never fail") {
            println!("{}.{} = {}", machine.name(), variable.name, variable.value);
        }
    }
}
