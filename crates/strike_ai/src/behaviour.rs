//! Behaviours - the states of an agent's state machine

use strike_core::FrameTime;

use crate::condition::{AgentView, ConditionContext};
use crate::events::AgentEvent;
use crate::transition::Transition;

/// Per-tick logic of a behaviour (patrol, chase, attack, ...)
///
/// All hooks default to doing nothing.
pub trait BehaviourLogic<A>: Send {
    fn start(&mut self, _agent: &mut A) {}
    fn stop(&mut self, _agent: &mut A) {}
    fn update(&mut self, _agent: &mut A, _time: &FrameTime) {}
    fn fixed_update(&mut self, _agent: &mut A, _time: &FrameTime) {}
    fn late_update(&mut self, _agent: &mut A, _time: &FrameTime) {}
}

/// Logic that does nothing
pub struct NoLogic;

impl<A> BehaviourLogic<A> for NoLogic {}

/// Side effect fired every time the behaviour starts
pub type StartHook<A> = Box<dyn FnMut(&mut A) + Send>;

/// A named state owning its outgoing transitions
pub struct Behaviour<A> {
    name: String,
    transitions: Vec<Transition>,
    logic: Box<dyn BehaviourLogic<A>>,
    on_start: Vec<StartHook<A>>,
    /// Seconds since the last `start`
    elapsed: f32,
    active: bool,
}

impl<A: AgentView> Behaviour<A> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transitions: Vec::new(),
            logic: Box::new(NoLogic),
            on_start: Vec::new(),
            elapsed: 0.0,
            active: false,
        }
    }

    pub fn with_logic<L: BehaviourLogic<A> + 'static>(mut self, logic: L) -> Self {
        self.logic = Box::new(logic);
        self
    }

    pub fn with_boxed_logic(mut self, logic: Box<dyn BehaviourLogic<A>>) -> Self {
        self.logic = logic;
        self
    }

    /// Append a transition; earlier transitions take precedence
    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Register a start side effect
    pub fn on_start<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut A) + Send + 'static,
    {
        self.on_start.push(Box::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn transitions_mut(&mut self) -> &mut [Transition] {
        &mut self.transitions
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Seconds since the behaviour was last started
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Activate: enable every condition, then fire start hooks and logic
    pub fn start(&mut self, agent: &mut A) {
        for transition in &mut self.transitions {
            transition.enable_conditions();
        }
        self.elapsed = 0.0;
        self.active = true;

        for hook in &mut self.on_start {
            hook(agent);
        }
        self.logic.start(agent);
    }

    /// Deactivate: disable every condition so none of them sees events
    pub fn stop(&mut self, agent: &mut A) {
        for transition in &mut self.transitions {
            transition.disable_conditions();
        }
        self.active = false;
        self.logic.stop(agent);
    }

    pub fn update(&mut self, agent: &mut A, time: &FrameTime) {
        self.elapsed += time.delta_time;
        self.logic.update(agent, time);
    }

    pub fn fixed_update(&mut self, agent: &mut A, time: &FrameTime) {
        self.logic.fixed_update(agent, time);
    }

    /// Run late logic, then look for a transition to take
    ///
    /// Returns the name of the behaviour to switch to.
    pub fn late_update(&mut self, agent: &mut A, time: &FrameTime) -> Option<String> {
        self.logic.late_update(agent, time);
        self.check_transition_conditions(agent, time)
    }

    /// First transition (in declaration order) whose conditions all hold
    ///
    /// Transitions after the first match are not evaluated.
    pub fn check_transition_conditions(&mut self, agent: &A, time: &FrameTime) -> Option<String> {
        let ctx = ConditionContext {
            agent,
            time: *time,
            time_in_behaviour: self.elapsed,
        };

        self.transitions
            .iter_mut()
            .find_map(|t| t.make_transition(&ctx).then(|| t.next_behaviour().to_string()))
    }

    /// Forward an event to the conditions of every transition
    pub fn handle_event(&mut self, event: &AgentEvent, time: &FrameTime) {
        for transition in &mut self.transitions {
            transition.handle_event(event, time);
        }
    }
}

impl<A> std::fmt::Debug for Behaviour<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Behaviour")
            .field("name", &self.name)
            .field("transitions", &self.transitions.len())
            .field("active", &self.active)
            .finish()
    }
}
