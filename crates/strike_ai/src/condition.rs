//! Transition conditions and the slot that gates them

use serde::{Deserialize, Serialize};
use strike_core::FrameTime;

use crate::events::AgentEvent;

/// Read-only view of the agent that conditions evaluate against
pub trait AgentView {
    /// Current health
    fn health(&self) -> f32;

    /// Distance to the current target, if there is one
    fn target_distance(&self) -> Option<f32> {
        None
    }
}

/// Everything a condition can look at during evaluation
pub struct ConditionContext<'a> {
    pub agent: &'a dyn AgentView,
    pub time: FrameTime,
    /// Seconds since the owning behaviour was started
    pub time_in_behaviour: f32,
}

/// A boolean predicate guarding a transition
///
/// Conditions may keep state between ticks. State that comes from events is
/// fed through `on_event`, which is only called while the condition is
/// enabled (its behaviour is active).
pub trait Condition: Send {
    /// Short name used in logs
    fn kind(&self) -> &'static str;

    /// Whether the condition currently holds
    fn is_executed(&mut self, ctx: &ConditionContext<'_>) -> bool;

    /// The owning behaviour was started
    fn on_enable(&mut self) {}

    /// The owning behaviour was stopped
    fn on_disable(&mut self) {}

    /// An agent event arrived while enabled
    fn on_event(&mut self, _event: &AgentEvent, _time: &FrameTime) {}
}

/// Numeric comparison used by threshold conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Equal,
    NotEqual,
    Greater,
    Less,
}

impl Comparison {
    /// Compare `value` against `threshold`
    pub fn compare(self, value: f32, threshold: f32) -> bool {
        match self {
            Comparison::Equal => (value - threshold).abs() <= f32::EPSILON,
            Comparison::NotEqual => (value - threshold).abs() > f32::EPSILON,
            Comparison::Greater => value > threshold,
            Comparison::Less => value < threshold,
        }
    }
}

impl Default for Comparison {
    fn default() -> Self {
        Self::Equal
    }
}

/// A condition plus its mute flag and enable gate
///
/// Enabling and disabling are idempotent: starting a behaviour twice without
/// stopping it never delivers events twice or re-runs `on_enable`.
pub struct ConditionSlot {
    condition: Box<dyn Condition>,
    mute: bool,
    enabled: bool,
}

impl ConditionSlot {
    pub fn new(condition: Box<dyn Condition>) -> Self {
        Self {
            condition,
            mute: false,
            enabled: false,
        }
    }

    pub fn muted(mut self, mute: bool) -> Self {
        self.mute = mute;
        self
    }

    pub fn is_muted(&self) -> bool {
        self.mute
    }

    pub fn set_mute(&mut self, mute: bool) {
        self.mute = mute;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn kind(&self) -> &'static str {
        self.condition.kind()
    }

    pub fn enable(&mut self) {
        if !self.enabled {
            self.enabled = true;
            self.condition.on_enable();
        }
    }

    pub fn disable(&mut self) {
        if self.enabled {
            self.enabled = false;
            self.condition.on_disable();
        }
    }

    pub fn handle_event(&mut self, event: &AgentEvent, time: &FrameTime) {
        if self.enabled {
            self.condition.on_event(event, time);
        }
    }

    /// Evaluate the wrapped condition, ignoring the mute flag
    pub fn evaluate(&mut self, ctx: &ConditionContext<'_>) -> bool {
        self.condition.is_executed(ctx)
    }
}

impl std::fmt::Debug for ConditionSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionSlot")
            .field("kind", &self.condition.kind())
            .field("mute", &self.mute)
            .field("enabled", &self.enabled)
            .finish()
    }
}
