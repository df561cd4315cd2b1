//! Built-in conditions
//!
//! Each one deserializes from the `params` object of a condition definition;
//! runtime flags are skipped by serde and start cleared.

use serde::{Deserialize, Serialize};
use strike_core::FrameTime;

use crate::condition::{Comparison, Condition, ConditionContext};
use crate::events::AgentEvent;

/// Compares the agent's health against a threshold every tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCompareCondition {
    pub comparison: Comparison,
    pub value: f32,
}

impl HealthCompareCondition {
    pub fn new(comparison: Comparison, value: f32) -> Self {
        Self { comparison, value }
    }
}

impl Condition for HealthCompareCondition {
    fn kind(&self) -> &'static str {
        "health_compare"
    }

    fn is_executed(&mut self, ctx: &ConditionContext<'_>) -> bool {
        self.comparison.compare(ctx.agent.health(), self.value)
    }
}

/// True for the rest of the frame in which damage was taken
///
/// Several hits in one frame still produce a single one-frame pulse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnTakeDamageCondition {
    #[serde(skip)]
    damaged_frame: Option<u64>,
}

impl OnTakeDamageCondition {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Condition for OnTakeDamageCondition {
    fn kind(&self) -> &'static str {
        "on_take_damage"
    }

    fn is_executed(&mut self, ctx: &ConditionContext<'_>) -> bool {
        self.damaged_frame == Some(ctx.time.frame)
    }

    fn on_disable(&mut self) {
        self.damaged_frame = None;
    }

    fn on_event(&mut self, event: &AgentEvent, time: &FrameTime) {
        if let AgentEvent::Damaged { .. } = event {
            self.damaged_frame = Some(time.frame);
        }
    }
}

/// Latches true when a target is found, false again when it is lost
///
/// Events only arrive while the owning behaviour is active, so the latch
/// starts cleared every time the behaviour starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldOfViewFindCondition {
    #[serde(skip)]
    found: bool,
}

impl FieldOfViewFindCondition {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Condition for FieldOfViewFindCondition {
    fn kind(&self) -> &'static str {
        "fov_find"
    }

    fn is_executed(&mut self, _ctx: &ConditionContext<'_>) -> bool {
        self.found
    }

    fn on_enable(&mut self) {
        self.found = false;
    }

    fn on_event(&mut self, event: &AgentEvent, _time: &FrameTime) {
        match event {
            AgentEvent::TargetFound { .. } => self.found = true,
            AgentEvent::TargetLost { .. } => self.found = false,
            AgentEvent::Damaged { .. } => {}
        }
    }
}

/// Latches true when a target is lost, false again when one is found
///
/// Cleared on start, like [`FieldOfViewFindCondition`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldOfViewLostCondition {
    #[serde(skip)]
    lost: bool,
}

impl FieldOfViewLostCondition {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Condition for FieldOfViewLostCondition {
    fn kind(&self) -> &'static str {
        "fov_lost"
    }

    fn is_executed(&mut self, _ctx: &ConditionContext<'_>) -> bool {
        self.lost
    }

    fn on_enable(&mut self) {
        self.lost = false;
    }

    fn on_event(&mut self, event: &AgentEvent, _time: &FrameTime) {
        match event {
            AgentEvent::TargetLost { .. } => self.lost = true,
            AgentEvent::TargetFound { .. } => self.lost = false,
            AgentEvent::Damaged { .. } => {}
        }
    }
}

/// True once the behaviour has been running for `seconds`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElapsedTimeCondition {
    pub seconds: f32,
}

impl ElapsedTimeCondition {
    pub fn new(seconds: f32) -> Self {
        Self { seconds }
    }
}

impl Condition for ElapsedTimeCondition {
    fn kind(&self) -> &'static str {
        "elapsed_time"
    }

    fn is_executed(&mut self, ctx: &ConditionContext<'_>) -> bool {
        ctx.time_in_behaviour >= self.seconds
    }
}

/// Compares the distance to the current target; false without a target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetDistanceCondition {
    pub comparison: Comparison,
    pub distance: f32,
}

impl TargetDistanceCondition {
    pub fn new(comparison: Comparison, distance: f32) -> Self {
        Self {
            comparison,
            distance,
        }
    }
}

impl Condition for TargetDistanceCondition {
    fn kind(&self) -> &'static str {
        "target_distance"
    }

    fn is_executed(&mut self, ctx: &ConditionContext<'_>) -> bool {
        ctx.agent
            .target_distance()
            .map(|d| self.comparison.compare(d, self.distance))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::AgentView;

    struct Dummy {
        health: f32,
        target: Option<f32>,
    }

    impl AgentView for Dummy {
        fn health(&self) -> f32 {
            self.health
        }

        fn target_distance(&self) -> Option<f32> {
            self.target
        }
    }

    fn ctx(agent: &Dummy, frame: u64) -> ConditionContext<'_> {
        ConditionContext {
            agent,
            time: FrameTime::at(frame, 0.016),
            time_in_behaviour: 0.0,
        }
    }

    #[test]
    fn test_health_less_than() {
        let mut condition = HealthCompareCondition::new(Comparison::Less, 20.0);

        let hurt = Dummy { health: 15.0, target: None };
        assert!(condition.is_executed(&ctx(&hurt, 1)));

        let healthy = Dummy { health: 25.0, target: None };
        assert!(!condition.is_executed(&ctx(&healthy, 2)));
    }

    #[test]
    fn test_damage_pulse_lasts_one_frame() {
        let agent = Dummy { health: 100.0, target: None };
        let mut condition = OnTakeDamageCondition::new();
        let frame = FrameTime::at(7, 0.016);

        assert!(!condition.is_executed(&ctx(&agent, 7)));

        condition.on_event(&AgentEvent::damaged(10.0), &frame);
        condition.on_event(&AgentEvent::damaged(10.0), &frame);
        assert!(condition.is_executed(&ctx(&agent, 7)));
        assert!(condition.is_executed(&ctx(&agent, 7)));
        assert!(!condition.is_executed(&ctx(&agent, 8)));
    }

    #[test]
    fn test_damage_pulse_cleared_on_disable() {
        let agent = Dummy { health: 100.0, target: None };
        let mut condition = OnTakeDamageCondition::new();

        condition.on_event(&AgentEvent::damaged(1.0), &FrameTime::at(3, 0.016));
        condition.on_disable();
        assert!(!condition.is_executed(&ctx(&agent, 3)));
    }

    #[test]
    fn test_fov_conditions_latch() {
        let agent = Dummy { health: 100.0, target: None };
        let time = FrameTime::at(1, 0.016);
        let mut find = FieldOfViewFindCondition::new();
        let mut lost = FieldOfViewLostCondition::new();

        for c in [&mut find as &mut dyn Condition, &mut lost] {
            c.on_event(&AgentEvent::TargetFound { target: 9 }, &time);
        }
        assert!(find.is_executed(&ctx(&agent, 1)));
        assert!(!lost.is_executed(&ctx(&agent, 1)));

        // Level holds across frames until the opposite edge
        assert!(find.is_executed(&ctx(&agent, 50)));

        for c in [&mut find as &mut dyn Condition, &mut lost] {
            c.on_event(&AgentEvent::TargetLost { target: 9 }, &time);
        }
        assert!(!find.is_executed(&ctx(&agent, 51)));
        assert!(lost.is_executed(&ctx(&agent, 51)));
    }

    #[test]
    fn test_fov_latches_reset_on_enable() {
        let agent = Dummy { health: 100.0, target: None };
        let time = FrameTime::at(4, 0.016);
        let mut find = FieldOfViewFindCondition::new();
        let mut lost = FieldOfViewLostCondition::new();

        find.on_event(&AgentEvent::TargetFound { target: 2 }, &time);
        lost.on_event(&AgentEvent::TargetLost { target: 2 }, &time);

        // The opposite edge fired while these were unsubscribed
        find.on_disable();
        lost.on_disable();
        find.on_enable();
        lost.on_enable();
        assert!(!find.is_executed(&ctx(&agent, 9)));
        assert!(!lost.is_executed(&ctx(&agent, 9)));
    }

    #[test]
    fn test_elapsed_time() {
        let agent = Dummy { health: 100.0, target: None };
        let mut condition = ElapsedTimeCondition::new(2.0);

        let mut c = ctx(&agent, 1);
        c.time_in_behaviour = 1.5;
        assert!(!condition.is_executed(&c));
        c.time_in_behaviour = 2.0;
        assert!(condition.is_executed(&c));
    }

    #[test]
    fn test_target_distance() {
        let mut condition = TargetDistanceCondition::new(Comparison::Less, 5.0);

        let none = Dummy { health: 100.0, target: None };
        assert!(!condition.is_executed(&ctx(&none, 1)));

        let close = Dummy { health: 100.0, target: Some(3.0) };
        assert!(condition.is_executed(&ctx(&close, 1)));
    }
}
