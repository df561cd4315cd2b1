//! Simulated agents and the logic attached to their behaviours

use strike_ai::{AgentView, BehaviourLogic};
use strike_core::{FrameTime, Id, StableId};
use strike_pool::Poolable;

use crate::config::AgentConfig;

/// What the agent is currently looking at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub id: u64,
    pub distance: f32,
}

/// A headless agent
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: Id,
    pub name: String,
    pub health: f32,
    pub max_health: f32,
    /// Units per second
    pub speed: f32,
    pub target: Option<Target>,
    /// Shots requested by attack logic, serviced by the world after the tick
    pub pending_shots: u32,
    /// Damage taken since spawn
    pub damage_taken: f32,
}

impl Agent {
    pub fn from_config(id: Id, config: &AgentConfig) -> Self {
        Self {
            id,
            name: config.name.clone(),
            health: config.health,
            max_health: config.health,
            speed: config.speed,
            target: None,
            pending_shots: 0,
            damage_taken: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Subtract health, never below zero. Returns the damage actually applied.
    pub fn apply_damage(&mut self, amount: f32) -> f32 {
        let applied = amount.max(0.0).min(self.health);
        self.health -= applied;
        self.damage_taken += applied;
        applied
    }
}

impl AgentView for Agent {
    fn health(&self) -> f32 {
        self.health
    }

    fn target_distance(&self) -> Option<f32> {
        self.target.map(|t| t.distance)
    }
}

/// Closes on the target
pub struct ChaseLogic;

impl BehaviourLogic<Agent> for ChaseLogic {
    fn update(&mut self, agent: &mut Agent, time: &FrameTime) {
        let step = agent.speed * time.delta_time;
        if let Some(target) = agent.target.as_mut() {
            target.distance = (target.distance - step).max(0.0);
        }
    }
}

/// Backs away from the target
pub struct FleeLogic;

impl BehaviourLogic<Agent> for FleeLogic {
    fn update(&mut self, agent: &mut Agent, time: &FrameTime) {
        let step = agent.speed * time.delta_time;
        if let Some(target) = agent.target.as_mut() {
            target.distance += step;
        }
    }
}

/// Requests a shot every `interval` seconds while active
pub struct AttackLogic {
    interval: f32,
    cooldown: f32,
}

impl AttackLogic {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            cooldown: 0.0,
        }
    }
}

impl BehaviourLogic<Agent> for AttackLogic {
    fn start(&mut self, _agent: &mut Agent) {
        self.cooldown = 0.0;
    }

    fn stop(&mut self, agent: &mut Agent) {
        agent.pending_shots = 0;
    }

    fn update(&mut self, agent: &mut Agent, time: &FrameTime) {
        if agent.target.is_none() {
            return;
        }

        self.cooldown -= time.delta_time;
        if self.cooldown <= 0.0 {
            let shots = (-self.cooldown / self.interval).floor() + 1.0;
            agent.pending_shots = agent.pending_shots.saturating_add(shots as u32);
            self.cooldown += shots * self.interval;
        }
    }
}

/// Pooled projectile
#[derive(Debug)]
pub struct Projectile {
    pub key: StableId,
    pub serial: u64,
    pub shooter: Option<Id>,
    pub in_flight: bool,
}

impl Poolable for Projectile {
    fn pool_key(&self) -> &StableId {
        &self.key
    }

    fn set_active(&mut self, active: bool) {
        self.in_flight = active;
        if !active {
            self.shooter = None;
        }
    }

    fn destroy(self) {
        log::trace!("Destroyed projectile {} from '{}'", self.serial, self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn agent() -> Agent {
        let mut agent = Agent::from_config(Id::new(0, 0), &AgentConfig::new("test"));
        agent.target = Some(Target { id: 1, distance: 10.0 });
        agent
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut agent = agent();
        assert_eq!(agent.apply_damage(30.0), 30.0);
        assert_eq!(agent.apply_damage(500.0), 70.0);
        assert!(!agent.is_alive());
        assert_eq!(agent.damage_taken, 100.0);
    }

    #[test]
    fn test_chase_and_flee_move() {
        let mut agent = agent();
        let time = FrameTime::at(1, 0.5);

        ChaseLogic.update(&mut agent, &time);
        assert_relative_eq!(agent.target_distance().unwrap(), 8.0);

        FleeLogic.update(&mut agent, &time);
        assert_relative_eq!(agent.target_distance().unwrap(), 10.0);
    }

    #[test]
    fn test_attack_cadence() {
        let mut agent = agent();
        let mut logic = AttackLogic::new(0.25);
        logic.start(&mut agent);

        for frame in 1..=4 {
            logic.update(&mut agent, &FrameTime::at(frame, 0.125));
        }
        // Shots at t=0, 0.25 and 0.5
        assert_eq!(agent.pending_shots, 3);

        logic.stop(&mut agent);
        assert_eq!(agent.pending_shots, 0);
    }

    #[test]
    fn test_attack_long_frame_fires_in_one_step() {
        let mut agent = agent();
        let mut logic = AttackLogic::new(0.125);
        logic.start(&mut agent);

        // Shots at t=0, 0.125, ..., 1.0
        logic.update(&mut agent, &FrameTime::at(1, 1.0));
        assert_eq!(agent.pending_shots, 9);

        logic.update(&mut agent, &FrameTime::at(2, 0.0625));
        assert_eq!(agent.pending_shots, 9);
        logic.update(&mut agent, &FrameTime::at(3, 0.0625));
        assert_eq!(agent.pending_shots, 10);
    }
}
