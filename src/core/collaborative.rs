//! The resolved collaborative state machine.

use crate::core::visitor::Visitor;
use crate::core::{GraphError, ResolvedStateMachine};
use indexmap::IndexMap;

/// A verified, fully resolved collaborative state machine.
///
/// Holds one resolved state machine per declaration, abstract ones
/// included, in declaration order. The graph is immutable once built and
/// is safe to share across threads.
#[derive(Clone, Debug, PartialEq)]
pub struct CollaborativeStateMachine {
    pub(crate) name: String,
    pub(crate) state_machines: IndexMap<String, ResolvedStateMachine>,
}

/// An event-mediated link between two concrete state machines: `producer`
/// raises `event` and `consumer` handles it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Collaboration {
    pub producer: String,
    pub consumer: String,
    pub event: String,
}

impl CollaborativeStateMachine {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state_machines(&self) -> impl Iterator<Item = &ResolvedStateMachine> {
        self.state_machines.values()
    }

    pub fn state_machine_by_name(&self, name: &str) -> Result<&ResolvedStateMachine, GraphError> {
        self.state_machines
            .get(name)
            .ok_or_else(|| GraphError::UnknownStateMachine {
                name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.state_machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state_machines.is_empty()
    }

    /// Machines that are not abstract.
    pub fn concrete_state_machines(&self) -> impl Iterator<Item = &ResolvedStateMachine> {
        self.state_machines().filter(|sm| !sm.is_abstract())
    }

    /// Every producer/consumer pair among concrete machines, ordered by
    /// producer, then event, then consumer. A machine handling its own
    /// event is not a collaboration.
    pub fn collaborations(&self) -> Vec<Collaboration> {
        let mut collaborations = Vec::new();
        for producer in self.concrete_state_machines() {
            for event in producer.output_events() {
                for consumer in self.concrete_state_machines() {
                    if consumer.name() != producer.name() && consumer.handles(event) {
                        collaborations.push(Collaboration {
                            producer: producer.name().to_string(),
                            consumer: consumer.name().to_string(),
                            event: event.clone(),
                        });
                    }
                }
            }
        }
        collaborations
    }

    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_collaborative_state_machine(self);
    }
}
