//! Behaviour machine - owner of an agent's behaviours

use std::collections::HashMap;

use strike_core::FrameTime;

use crate::behaviour::Behaviour;
use crate::condition::AgentView;
use crate::error::{GraphError, Result};
use crate::events::AgentEvent;

/// Something that can switch an agent between named behaviours
pub trait BehaviourOwner<A> {
    /// Stop the current behaviour and start `name`. Returns false if unknown.
    fn switch_behaviour(&mut self, name: &str, agent: &mut A) -> bool;
}

/// Drives one active behaviour per agent
///
/// Each tick runs `update`, `fixed_update` and `late_update` on the active
/// behaviour only. When `late_update` reports a transition the machine stops
/// the current behaviour and starts the target: at most one switch per tick.
pub struct BehaviourMachine<A> {
    /// Behaviours in declaration order
    behaviours: Vec<Behaviour<A>>,
    index: HashMap<String, usize>,
    initial: Option<String>,
    active: Option<usize>,
    previous: Option<usize>,
    switch_count: u64,
}

impl<A: AgentView> BehaviourMachine<A> {
    pub fn new() -> Self {
        Self {
            behaviours: Vec::new(),
            index: HashMap::new(),
            initial: None,
            active: None,
            previous: None,
            switch_count: 0,
        }
    }

    /// Register a behaviour. Names must be unique within the machine.
    pub fn add_behaviour(&mut self, behaviour: Behaviour<A>) -> Result<()> {
        let name = behaviour.name().to_string();
        if self.index.contains_key(&name) {
            return Err(GraphError::DuplicateBehaviour(name));
        }
        self.index.insert(name, self.behaviours.len());
        self.behaviours.push(behaviour);
        Ok(())
    }

    /// Builder form of [`BehaviourMachine::add_behaviour`]
    pub fn with_behaviour(mut self, behaviour: Behaviour<A>) -> Result<Self> {
        self.add_behaviour(behaviour)?;
        Ok(self)
    }

    /// Behaviour started by [`BehaviourMachine::start`]
    pub fn set_initial(&mut self, name: impl Into<String>) {
        self.initial = Some(name.into());
    }

    pub fn initial(&self) -> Option<&str> {
        self.initial.as_deref()
    }

    /// Check that every transition target and the initial behaviour exist
    pub fn validate(&self) -> Result<()> {
        if let Some(initial) = &self.initial {
            if !self.index.contains_key(initial) {
                return Err(GraphError::UnknownInitial(initial.clone()));
            }
        }

        for behaviour in &self.behaviours {
            for transition in behaviour.transitions() {
                let target = transition.next_behaviour();
                if !self.index.contains_key(target) {
                    return Err(GraphError::UnknownTarget {
                        from: behaviour.name().to_string(),
                        to: target.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Start the initial behaviour. Returns false if none is set or it is unknown.
    pub fn start(&mut self, agent: &mut A) -> bool {
        match self.initial.clone() {
            Some(initial) => self.switch_behaviour(&initial, agent),
            None => false,
        }
    }

    /// Stop whichever behaviour is active; the machine goes idle
    pub fn shutdown(&mut self, agent: &mut A) {
        if let Some(current) = self.active.take() {
            self.behaviours[current].stop(agent);
            self.previous = Some(current);
        }
    }

    /// Stop the active behaviour and start `name`
    ///
    /// Unknown names leave the machine untouched. Switching to the active
    /// behaviour restarts it.
    pub fn switch_behaviour(&mut self, name: &str, agent: &mut A) -> bool {
        let Some(&target) = self.index.get(name) else {
            log::warn!("Cannot switch to unknown behaviour '{}'", name);
            return false;
        };

        if let Some(current) = self.active {
            self.behaviours[current].stop(agent);
            log::debug!(
                "Behaviour switch: '{}' -> '{}'",
                self.behaviours[current].name(),
                name
            );
        } else {
            log::debug!("Behaviour start: '{}'", name);
        }

        self.previous = self.active;
        self.active = Some(target);
        self.switch_count += 1;
        self.behaviours[target].start(agent);
        true
    }

    /// Run one tick of the active behaviour
    ///
    /// Returns the name of the behaviour switched to, if a transition fired.
    pub fn tick(&mut self, agent: &mut A, time: &FrameTime) -> Option<String> {
        let index = self.active?;
        let behaviour = &mut self.behaviours[index];

        behaviour.update(agent, time);
        behaviour.fixed_update(agent, time);
        let next = behaviour.late_update(agent, time)?;

        self.switch_behaviour(&next, agent).then_some(next)
    }

    /// Deliver an event to the active behaviour's conditions
    pub fn handle_event(&mut self, event: &AgentEvent, time: &FrameTime) {
        if let Some(index) = self.active {
            self.behaviours[index].handle_event(event, time);
        }
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.map(|i| self.behaviours[i].name())
    }

    pub fn previous_name(&self) -> Option<&str> {
        self.previous.map(|i| self.behaviours[i].name())
    }

    pub fn active(&self) -> Option<&Behaviour<A>> {
        self.active.map(|i| &self.behaviours[i])
    }

    pub fn behaviour(&self, name: &str) -> Option<&Behaviour<A>> {
        self.index.get(name).map(|&i| &self.behaviours[i])
    }

    pub fn behaviour_mut(&mut self, name: &str) -> Option<&mut Behaviour<A>> {
        let index = *self.index.get(name)?;
        Some(&mut self.behaviours[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.behaviours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviours.is_empty()
    }

    /// Number of switches performed since creation
    pub fn switch_count(&self) -> u64 {
        self.switch_count
    }
}

impl<A: AgentView> BehaviourOwner<A> for BehaviourMachine<A> {
    fn switch_behaviour(&mut self, name: &str, agent: &mut A) -> bool {
        BehaviourMachine::switch_behaviour(self, name, agent)
    }
}

impl<A: AgentView> Default for BehaviourMachine<A> {
    fn default() -> Self {
        Self::new()
    }
}
