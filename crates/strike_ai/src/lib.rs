//! # strike_ai - Behaviour State Machines
//!
//! Agents switch between named behaviours (patrol, chase, flee, ...). Each
//! behaviour owns an ordered list of transitions, and each transition is
//! guarded by a list of conditions that must all hold.
//!
//! - `Condition`: predicate over the agent, frame time and agent events
//! - `Transition`: short-circuit conjunction of conditions, with mute flags
//! - `Behaviour`: lifecycle hooks plus transitions checked in `late_update`
//! - `BehaviourMachine`: runs the active behaviour and performs switches
//! - `ConditionRegistry` / `GraphBuilder`: build machines from JSON graphs
//!
//! # Example
//!
//! ```ignore
//! use strike_ai::prelude::*;
//!
//! let mut machine = BehaviourMachine::new()
//!     .with_behaviour(Behaviour::new("patrol").with_transition(
//!         Transition::new("chase").with_condition(FieldOfViewFindCondition::new()),
//!     ))?
//!     .with_behaviour(Behaviour::new("chase"))?;
//! machine.set_initial("patrol");
//! machine.start(&mut guard);
//!
//! // every frame
//! machine.handle_event(&event, &time);
//! machine.tick(&mut guard, &time);
//! ```

pub mod behaviour;
pub mod condition;
pub mod conditions;
pub mod error;
pub mod events;
pub mod graph;
pub mod machine;
pub mod registry;
pub mod transition;

pub use error::{GraphError, Result};

pub mod prelude {
    pub use crate::behaviour::{Behaviour, BehaviourLogic, NoLogic};
    pub use crate::condition::{AgentView, Comparison, Condition, ConditionContext, ConditionSlot};
    pub use crate::conditions::{
        ElapsedTimeCondition, FieldOfViewFindCondition, FieldOfViewLostCondition,
        HealthCompareCondition, OnTakeDamageCondition, TargetDistanceCondition,
    };
    pub use crate::error::GraphError;
    pub use crate::events::AgentEvent;
    pub use crate::graph::{
        BehaviourDef, BehaviourGraphDef, ConditionDef, GraphBuilder, TransitionDef,
    };
    pub use crate::machine::{BehaviourMachine, BehaviourOwner};
    pub use crate::registry::ConditionRegistry;
    pub use crate::transition::Transition;
}

pub use prelude::*;
