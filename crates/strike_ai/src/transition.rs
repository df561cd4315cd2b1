//! Guarded edges between behaviours

use strike_core::FrameTime;

use crate::condition::{Condition, ConditionContext, ConditionSlot};
use crate::events::AgentEvent;

/// A transition to `next`, guarded by the conjunction of its conditions
#[derive(Debug)]
pub struct Transition {
    next: String,
    conditions: Vec<ConditionSlot>,
    mute: bool,
}

impl Transition {
    /// Create a transition to the named behaviour
    pub fn new(next: impl Into<String>) -> Self {
        Self {
            next: next.into(),
            conditions: Vec::new(),
            mute: false,
        }
    }

    /// Append a condition
    pub fn with_condition<C: Condition + 'static>(self, condition: C) -> Self {
        self.with_slot(ConditionSlot::new(Box::new(condition)))
    }

    /// Append a muted condition
    pub fn with_muted_condition<C: Condition + 'static>(self, condition: C) -> Self {
        self.with_slot(ConditionSlot::new(Box::new(condition)).muted(true))
    }

    pub fn with_slot(mut self, slot: ConditionSlot) -> Self {
        self.conditions.push(slot);
        self
    }

    pub fn muted(mut self, mute: bool) -> Self {
        self.mute = mute;
        self
    }

    pub fn set_mute(&mut self, mute: bool) {
        self.mute = mute;
    }

    pub fn is_muted(&self) -> bool {
        self.mute
    }

    /// Name of the behaviour this transition switches to
    pub fn next_behaviour(&self) -> &str {
        &self.next
    }

    pub fn conditions(&self) -> &[ConditionSlot] {
        &self.conditions
    }

    pub fn conditions_mut(&mut self) -> &mut [ConditionSlot] {
        &mut self.conditions
    }

    /// Whether the transition fires this tick
    ///
    /// A muted transition never fires. Muted conditions are skipped; the first
    /// unmuted condition that fails stops evaluation, so later conditions are
    /// not consulted.
    pub fn make_transition(&mut self, ctx: &ConditionContext<'_>) -> bool {
        if self.mute {
            return false;
        }

        for slot in &mut self.conditions {
            if slot.is_muted() {
                continue;
            }
            if !slot.evaluate(ctx) {
                return false;
            }
        }
        true
    }

    pub fn enable_conditions(&mut self) {
        for slot in &mut self.conditions {
            slot.enable();
        }
    }

    pub fn disable_conditions(&mut self) {
        for slot in &mut self.conditions {
            slot.disable();
        }
    }

    pub fn handle_event(&mut self, event: &AgentEvent, time: &FrameTime) {
        for slot in &mut self.conditions {
            slot.handle_event(event, time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::AgentView;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Idle;

    impl AgentView for Idle {
        fn health(&self) -> f32 {
            100.0
        }
    }

    /// Fixed result, counts evaluations
    struct Fixed {
        result: bool,
        calls: Arc<AtomicUsize>,
    }

    impl Fixed {
        fn new(result: bool) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (Self { result, calls: calls.clone() }, calls)
        }
    }

    impl Condition for Fixed {
        fn kind(&self) -> &'static str {
            "fixed"
        }

        fn is_executed(&mut self, _ctx: &ConditionContext<'_>) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
        }
    }

    fn ctx(agent: &Idle) -> ConditionContext<'_> {
        ConditionContext {
            agent,
            time: FrameTime::at(1, 0.016),
            time_in_behaviour: 0.0,
        }
    }

    #[test]
    fn test_muted_condition_is_skipped() {
        let (a, _) = Fixed::new(true);
        let (b, b_calls) = Fixed::new(false);
        let (c, _) = Fixed::new(true);
        let mut transition = Transition::new("chase")
            .with_condition(a)
            .with_muted_condition(b)
            .with_condition(c);

        assert!(transition.make_transition(&ctx(&Idle)));
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_short_circuit() {
        let (a, a_calls) = Fixed::new(true);
        let (b, b_calls) = Fixed::new(false);
        let (c, c_calls) = Fixed::new(true);
        let mut transition = Transition::new("chase")
            .with_condition(a)
            .with_condition(b)
            .with_condition(c);

        assert!(!transition.make_transition(&ctx(&Idle)));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
        assert_eq!(c_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_muted_transition_never_fires() {
        let (a, a_calls) = Fixed::new(true);
        let mut transition = Transition::new("chase").with_condition(a).muted(true);

        assert!(!transition.make_transition(&ctx(&Idle)));
        assert_eq!(a_calls.load(Ordering::SeqCst), 0);

        transition.set_mute(false);
        assert!(transition.make_transition(&ctx(&Idle)));
    }

    #[test]
    fn test_empty_transition_fires() {
        let mut transition = Transition::new("idle");
        assert!(transition.make_transition(&ctx(&Idle)));
        assert_eq!(transition.next_behaviour(), "idle");
    }
}
