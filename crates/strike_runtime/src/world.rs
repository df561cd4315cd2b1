//! Simulation world
//!
//! Owns every agent, the projectile pools and the timeline. One call to
//! [`World::step`] is one frame:
//!
//! 1. Scripted actions for the frame mutate agents and queue agent events
//! 2. Queued events are delivered to each agent's active behaviour
//! 3. Every live agent ticks its behaviour machine (at most one switch each)
//! 4. Shots requested by attack logic are served from the projectile pool
//! 5. Due projectile returns run

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use strike_ai::{
    AgentEvent, BehaviourGraphDef, BehaviourLogic, BehaviourMachine, ConditionRegistry,
    GraphBuilder,
};
use strike_core::{EventChannel, FrameClock, FrameTime, IdGenerator, Scheduler, StableId};
use strike_pool::{FnTemplate, PoolManager, PoolStats, SharedTemplate, Template};

use crate::agent::{Agent, AttackLogic, ChaseLogic, FleeLogic, Projectile, Target};
use crate::config::{ScriptAction, ScriptedEvent, SimConfig, WeaponConfig};
use crate::error::{Result, RuntimeError};

/// An agent together with the machine driving it
pub struct AgentSlot {
    pub agent: Agent,
    pub machine: BehaviourMachine<Agent>,
}

/// Counters accumulated over a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimStats {
    pub frames: u64,
    pub switches: u64,
    pub events_delivered: u64,
    pub shots_fired: u64,
    /// Shots requested while the projectile pool was exhausted
    pub dry_fires: u64,
    pub projectiles_returned: u64,
}

/// Final state of one agent
#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    pub name: String,
    pub behaviour: Option<String>,
    pub health: f32,
    pub switches: u64,
}

/// Final state of one pool
#[derive(Debug, Clone, Serialize)]
pub struct PoolSummary {
    pub key: String,
    pub capacity: usize,
    pub available: usize,
    pub outstanding: usize,
    pub created: u64,
    pub destroyed: u64,
}

impl PoolSummary {
    fn new(key: &StableId, stats: PoolStats) -> Self {
        Self {
            key: key.to_string(),
            capacity: stats.capacity,
            available: stats.available,
            outstanding: stats.outstanding,
            created: stats.created,
            destroyed: stats.destroyed,
        }
    }
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
pub struct SimSummary {
    pub stats: SimStats,
    pub agents: Vec<AgentSummary>,
    pub pools: Vec<PoolSummary>,
}

/// Headless world running agents against a scripted timeline
pub struct World {
    clock: FrameClock,
    delta_time: f32,
    weapon: WeaponConfig,
    projectile_key: StableId,
    agents: Vec<AgentSlot>,
    by_name: HashMap<String, usize>,
    events: EventChannel<(usize, AgentEvent)>,
    pools: PoolManager<Projectile>,
    returns: Scheduler<PoolManager<Projectile>>,
    /// Sorted by frame, stable for equal frames
    script: Vec<ScriptedEvent>,
    script_cursor: usize,
    stats: SimStats,
}

impl World {
    /// Build the world: parse the graph, spawn agents, prewarm pools
    pub fn from_config(config: &SimConfig) -> Result<Self> {
        config.validate()?;

        let registry = ConditionRegistry::with_builtins();
        let def = BehaviourGraphDef::from_json(&config.graph_source()?)?;
        let interval = config.weapon.fire_interval;
        let builder = GraphBuilder::new(&registry)
            .with_logic("chase", || Box::new(ChaseLogic) as Box<dyn BehaviourLogic<Agent>>)
            .with_logic("attack", move || {
                Box::new(AttackLogic::new(interval)) as Box<dyn BehaviourLogic<Agent>>
            })
            .with_logic("flee", || Box::new(FleeLogic) as Box<dyn BehaviourLogic<Agent>>);

        let ids = IdGenerator::new();
        let mut agents = Vec::with_capacity(config.agents.len());
        let mut by_name = HashMap::new();
        for agent_config in &config.agents {
            let mut agent = Agent::from_config(ids.next(), agent_config);
            let mut machine = builder.build(&def)?;
            if !machine.start(&mut agent) {
                return Err(RuntimeError::InvalidSetup(format!(
                    "agent '{}' has no initial behaviour",
                    agent.name
                )));
            }
            by_name.insert(agent.name.clone(), agents.len());
            agents.push(AgentSlot { agent, machine });
        }

        let mut pools = PoolManager::with_settings(config.pools.clone());
        let template = projectile_template(&config.weapon.projectile);
        let projectile_key = template.stable_id();
        pools.create_container_with_settings(template);

        let mut script = config.script.clone();
        script.sort_by_key(|event| event.frame);

        log::info!(
            "World ready: {} agents, graph '{}' with {} behaviours",
            agents.len(),
            def.initial,
            def.behaviours.len()
        );

        Ok(Self {
            clock: FrameClock::new(),
            delta_time: config.sim.delta_time,
            weapon: config.weapon.clone(),
            projectile_key,
            agents,
            by_name,
            events: EventChannel::new(),
            pools,
            returns: Scheduler::new(),
            script,
            script_cursor: 0,
            stats: SimStats::default(),
        })
    }

    /// Advance one frame
    pub fn step(&mut self) -> FrameTime {
        let time = self.clock.tick(self.delta_time);

        self.run_script(&time);
        self.dispatch_events(&time);
        self.tick_agents(&time);
        self.serve_shots(&time);

        let returned = self.returns.advance(&mut self.pools, &time);
        self.stats.projectiles_returned += returned as u64;
        self.stats.frames += 1;
        time
    }

    /// Run `frames` frames and summarize
    pub fn run(&mut self, frames: u64) -> SimSummary {
        for _ in 0..frames {
            self.step();
        }
        self.summary()
    }

    fn run_script(&mut self, time: &FrameTime) {
        while let Some(event) = self.script.get(self.script_cursor) {
            if event.frame > time.frame {
                break;
            }
            self.script_cursor += 1;

            let Some(&index) = self.by_name.get(&event.agent) else {
                log::warn!("Script event for unknown agent '{}'", event.agent);
                continue;
            };
            let agent = &mut self.agents[index].agent;

            let agent_event = match event.action {
                ScriptAction::Damage { amount, source } => {
                    let applied = agent.apply_damage(amount);
                    log::debug!(
                        "{} took {:.1} damage ({:.1} left)",
                        agent.name,
                        applied,
                        agent.health
                    );
                    AgentEvent::Damaged {
                        amount: applied,
                        source,
                    }
                }
                ScriptAction::Spot { target, distance } => {
                    agent.target = Some(Target { id: target, distance });
                    AgentEvent::TargetFound { target }
                }
                ScriptAction::Lose { target } => {
                    if agent.target.map(|t| t.id) == Some(target) {
                        agent.target = None;
                    }
                    AgentEvent::TargetLost { target }
                }
            };
            self.events.send((index, agent_event));
        }
    }

    fn dispatch_events(&mut self, time: &FrameTime) {
        for (index, event) in self.events.drain() {
            if let Some(slot) = self.agents.get_mut(index) {
                slot.machine.handle_event(&event, time);
                self.stats.events_delivered += 1;
            }
        }
    }

    fn tick_agents(&mut self, time: &FrameTime) {
        for slot in &mut self.agents {
            if !slot.agent.is_alive() {
                if slot.machine.active_name().is_some() {
                    log::info!("[frame {}] {} is down", time.frame, slot.agent.name);
                    slot.machine.shutdown(&mut slot.agent);
                }
                continue;
            }

            if let Some(next) = slot.machine.tick(&mut slot.agent, time) {
                self.stats.switches += 1;
                log::info!(
                    "[frame {}] {}: {} -> {}",
                    time.frame,
                    slot.agent.name,
                    slot.machine.previous_name().unwrap_or("-"),
                    next
                );
            }
        }
    }

    fn serve_shots(&mut self, time: &FrameTime) {
        for slot in &mut self.agents {
            let shots = std::mem::take(&mut slot.agent.pending_shots);
            for _ in 0..shots {
                match self.pools.pop(&self.projectile_key) {
                    Some(mut projectile) => {
                        projectile.shooter = Some(slot.agent.id);
                        self.stats.shots_fired += 1;
                        let lifetime = self.weapon.lifetime;
                        PoolManager::push_after(&mut self.returns, time, projectile, lifetime);
                    }
                    None => {
                        self.stats.dry_fires += 1;
                        log::trace!("{} is out of '{}'", slot.agent.name, self.projectile_key);
                    }
                }
            }
        }
    }

    pub fn agent(&self, name: &str) -> Option<&AgentSlot> {
        self.by_name.get(name).map(|&i| &self.agents[i])
    }

    pub fn agents(&self) -> &[AgentSlot] {
        &self.agents
    }

    pub fn pools(&self) -> &PoolManager<Projectile> {
        &self.pools
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    pub fn frame(&self) -> u64 {
        self.clock.frame()
    }

    /// Projectile returns still scheduled
    pub fn projectiles_in_flight(&self) -> usize {
        self.returns.pending_count()
    }

    pub fn summary(&self) -> SimSummary {
        let agents = self
            .agents
            .iter()
            .map(|slot| AgentSummary {
                name: slot.agent.name.clone(),
                behaviour: slot.machine.active_name().map(str::to_string),
                health: slot.agent.health,
                switches: slot.machine.switch_count(),
            })
            .collect();

        let mut pools: Vec<_> = self
            .pools
            .keys()
            .filter_map(|key| self.pools.stats(key).map(|stats| PoolSummary::new(key, stats)))
            .collect();
        pools.sort_by(|a, b| a.key.cmp(&b.key));

        SimSummary {
            stats: self.stats.clone(),
            agents,
            pools,
        }
    }
}

fn projectile_template(name: &str) -> SharedTemplate<Projectile> {
    let key = StableId::new(name);
    let serial = Arc::new(AtomicU64::new(0));
    FnTemplate::shared(name, move || Projectile {
        key: key.clone(),
        serial: serial.fetch_add(1, Ordering::Relaxed),
        shooter: None,
        in_flight: true,
    })
}
