//! Data-driven behaviour graphs
//!
//! A graph definition lists behaviours, their transitions and the conditions
//! guarding them. It is plain serde data, usually loaded from JSON:
//!
//! ```json
//! {
//!   "initial": "patrol",
//!   "behaviours": [
//!     { "name": "patrol", "transitions": [
//!       { "next": "chase", "conditions": [{ "kind": "fov_find" }] }
//!     ]},
//!     { "name": "chase", "transitions": [
//!       { "next": "patrol", "conditions": [{ "kind": "fov_lost" }] },
//!       { "next": "flee", "conditions": [
//!         { "kind": "health_compare", "params": { "comparison": "less", "value": 20.0 } }
//!       ]}
//!     ]},
//!     { "name": "flee" }
//!   ]
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::behaviour::{Behaviour, BehaviourLogic};
use crate::condition::{AgentView, ConditionSlot};
use crate::error::Result;
use crate::machine::BehaviourMachine;
use crate::registry::ConditionRegistry;
use crate::transition::Transition;

/// A complete behaviour graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviourGraphDef {
    /// Behaviour started first
    pub initial: String,
    pub behaviours: Vec<BehaviourDef>,
}

/// One behaviour and its outgoing transitions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviourDef {
    pub name: String,
    #[serde(default)]
    pub transitions: Vec<TransitionDef>,
}

/// A transition, in precedence order within its behaviour
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitionDef {
    pub next: String,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub conditions: Vec<ConditionDef>,
}

/// A condition kind plus its parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionDef {
    pub kind: String,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub params: Value,
}

impl BehaviourGraphDef {
    /// Parse a graph from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Names of every behaviour in declaration order
    pub fn behaviour_names(&self) -> impl Iterator<Item = &str> {
        self.behaviours.iter().map(|b| b.name.as_str())
    }
}

/// Produces fresh logic for a behaviour
pub type LogicFactory<A> = Box<dyn Fn() -> Box<dyn BehaviourLogic<A>>>;

/// Turns a [`BehaviourGraphDef`] into a validated [`BehaviourMachine`]
pub struct GraphBuilder<'a, A> {
    registry: &'a ConditionRegistry,
    logic: HashMap<String, LogicFactory<A>>,
}

impl<'a, A: AgentView> GraphBuilder<'a, A> {
    pub fn new(registry: &'a ConditionRegistry) -> Self {
        Self {
            registry,
            logic: HashMap::new(),
        }
    }

    /// Attach logic to every behaviour named `behaviour`
    pub fn with_logic<F>(mut self, behaviour: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn BehaviourLogic<A>> + 'static,
    {
        self.logic.insert(behaviour.into(), Box::new(factory));
        self
    }

    /// Build and validate a machine with the initial behaviour set
    ///
    /// Fails on unknown condition kinds, bad parameters, duplicate behaviour
    /// names, transitions to unknown behaviours or an unknown initial behaviour.
    pub fn build(&self, def: &BehaviourGraphDef) -> Result<BehaviourMachine<A>> {
        let mut machine = BehaviourMachine::new();

        for behaviour_def in &def.behaviours {
            let mut behaviour = Behaviour::new(behaviour_def.name.clone());
            if let Some(factory) = self.logic.get(&behaviour_def.name) {
                behaviour = behaviour.with_boxed_logic(factory());
            }

            for transition_def in &behaviour_def.transitions {
                behaviour = behaviour.with_transition(self.build_transition(transition_def)?);
            }
            machine.add_behaviour(behaviour)?;
        }

        machine.set_initial(def.initial.clone());
        machine.validate()?;

        log::debug!(
            "Built behaviour graph: {} behaviours, initial '{}'",
            machine.len(),
            def.initial
        );
        Ok(machine)
    }

    fn build_transition(&self, def: &TransitionDef) -> Result<Transition> {
        let mut transition = Transition::new(def.next.clone()).muted(def.mute);
        for condition in &def.conditions {
            let built = self.registry.create(&condition.kind, &condition.params)?;
            transition = transition.with_slot(ConditionSlot::new(built).muted(condition.mute));
        }
        Ok(transition)
    }
}
