//! Simulation Configuration
//!
//! Describes one headless skirmish: timing, pools, the weapon every agent
//! carries, the agents themselves and a scripted timeline of perception and
//! damage events.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables: `STRIKE_FRAMES=1200`, `STRIKE_GRAPH=guard.json`
//! 2. Config file given on the command line, or `strike.toml`
//! 3. The built-in skirmish preset
//!
//! # Example Config File
//!
//! ```toml
//! [sim]
//! frames = 600
//! delta_time = 0.016
//!
//! [pools]
//! default_policy = "free"
//! default_capacity = 4
//!
//! [pools.overrides.bullet]
//! policy = "fixed"
//! capacity = 16
//!
//! [weapon]
//! projectile = "bullet"
//! fire_interval = 0.1
//! lifetime = 0.5
//!
//! [[agents]]
//! name = "guard-1"
//! health = 100.0
//!
//! [[script]]
//! frame = 10
//! agent = "guard-1"
//! action = { kind = "spot", target = 7, distance = 12.0 }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strike_pool::{AllocatorPolicy, PoolSettings};

use crate::error::{Result, RuntimeError};

/// Behaviour graph used when no graph file is configured
pub const DEFAULT_GRAPH: &str = include_str!("../data/guard_graph.json");

/// Config file picked up from the working directory
const DEFAULT_CONFIG: &str = "strike.toml";

/// Shortest accepted time between shots, in seconds
pub const MIN_FIRE_INTERVAL: f32 = 0.001;

/// Frame timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Number of frames to run
    pub frames: u64,
    /// Seconds per frame
    pub delta_time: f32,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            frames: 600,
            delta_time: 1.0 / 60.0,
        }
    }
}

/// Weapon shared by every agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    /// Pool key of the projectile template
    pub projectile: String,
    /// Seconds between shots while attacking
    pub fire_interval: f32,
    /// Seconds a projectile flies before it returns to its pool
    pub lifetime: f32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            projectile: "bullet".to_string(),
            fire_interval: 0.1,
            lifetime: 0.5,
        }
    }
}

/// One simulated agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    #[serde(default = "default_health")]
    pub health: f32,
    /// Units per second the agent closes on its target while chasing
    #[serde(default = "default_speed")]
    pub speed: f32,
}

fn default_health() -> f32 {
    100.0
}

fn default_speed() -> f32 {
    4.0
}

impl AgentConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            health: default_health(),
            speed: default_speed(),
        }
    }
}

/// Something the timeline does to an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptAction {
    /// Deal damage
    Damage {
        amount: f32,
        #[serde(default)]
        source: Option<u64>,
    },
    /// A target enters the field of view
    Spot { target: u64, distance: f32 },
    /// The target leaves the field of view
    Lose { target: u64 },
}

/// Timeline entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedEvent {
    pub frame: u64,
    pub agent: String,
    pub action: ScriptAction,
}

impl ScriptedEvent {
    pub fn new(frame: u64, agent: impl Into<String>, action: ScriptAction) -> Self {
        Self {
            frame,
            agent: agent.into(),
            action,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub sim: SimSettings,
    pub pools: PoolSettings,
    pub weapon: WeaponConfig,
    /// Path to a behaviour graph JSON file
    pub graph: Option<PathBuf>,
    pub agents: Vec<AgentConfig>,
    pub script: Vec<ScriptedEvent>,
    /// File this config was loaded from
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sim: SimSettings::default(),
            pools: PoolSettings::default(),
            weapon: WeaponConfig::default(),
            graph: None,
            agents: vec![AgentConfig::new("guard-1")],
            script: Vec::new(),
            config_path: None,
        }
    }
}

impl SimConfig {
    /// One guard spots an intruder, chases, attacks, gets hurt and flees
    pub fn skirmish() -> Self {
        use ScriptAction::*;

        Self {
            sim: SimSettings {
                frames: 240,
                ..Default::default()
            },
            pools: PoolSettings::default().with_override("bullet", AllocatorPolicy::Fixed, 8),
            script: vec![
                ScriptedEvent::new(30, "guard-1", Spot { target: 7, distance: 6.0 }),
                ScriptedEvent::new(150, "guard-1", Damage { amount: 45.0, source: Some(7) }),
                ScriptedEvent::new(160, "guard-1", Damage { amount: 45.0, source: Some(7) }),
            ],
            ..Default::default()
        }
    }

    /// Load from the given file (or `strike.toml`), then apply env overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None if Path::new(DEFAULT_CONFIG).exists() => {
                Self::load_from_file(Path::new(DEFAULT_CONFIG))?
            }
            None => {
                log::info!("No config file, using skirmish preset");
                Self::skirmish()
            }
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| RuntimeError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let mut config = Self::from_toml(&content)?;
        config.config_path = Some(path.to_path_buf());
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override fields from `STRIKE_*` environment variables
    pub fn apply_env(&mut self) {
        if let Ok(frames) = std::env::var("STRIKE_FRAMES") {
            match frames.parse() {
                Ok(frames) => {
                    self.sim.frames = frames;
                    log::info!("Frames from env: {}", frames);
                }
                Err(_) => log::warn!("Ignoring STRIKE_FRAMES={}", frames),
            }
        }

        if let Ok(graph) = std::env::var("STRIKE_GRAPH") {
            if !graph.is_empty() {
                log::info!("Graph from env: {}", graph);
                self.graph = Some(PathBuf::from(graph));
            }
        }
    }

    /// Reject setups the simulation cannot run
    pub fn validate(&self) -> Result<()> {
        if self.sim.delta_time <= 0.0 {
            return Err(RuntimeError::InvalidSetup("delta_time must be positive".into()));
        }
        let interval = self.weapon.fire_interval;
        if interval.is_nan() || interval < MIN_FIRE_INTERVAL {
            return Err(RuntimeError::InvalidSetup(format!(
                "fire_interval must be at least {}s",
                MIN_FIRE_INTERVAL
            )));
        }

        for (i, agent) in self.agents.iter().enumerate() {
            if self.agents[..i].iter().any(|other| other.name == agent.name) {
                return Err(RuntimeError::InvalidSetup(format!(
                    "duplicate agent '{}'",
                    agent.name
                )));
            }
        }

        for event in &self.script {
            if !self.agents.iter().any(|agent| agent.name == event.agent) {
                return Err(RuntimeError::InvalidSetup(format!(
                    "script at frame {} targets unknown agent '{}'",
                    event.frame, event.agent
                )));
            }
        }
        Ok(())
    }

    /// JSON text of the behaviour graph to run
    pub fn graph_source(&self) -> Result<String> {
        match &self.graph {
            Some(path) => std::fs::read_to_string(path).map_err(|source| RuntimeError::Io {
                path: path.display().to_string(),
                source,
            }),
            None => Ok(DEFAULT_GRAPH.to_string()),
        }
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        log::info!("Simulation Configuration:");
        log::info!("  Frames: {} @ {:.4}s", self.sim.frames, self.sim.delta_time);
        log::info!(
            "  Pools: {:?} x{} default, {} overrides",
            self.pools.default_policy,
            self.pools.default_capacity,
            self.pools.overrides.len()
        );
        log::info!("  Agents: {}, scripted events: {}", self.agents.len(), self.script.len());
        match &self.graph {
            Some(path) => log::info!("  Graph: {}", path.display()),
            None => log::info!("  Graph: built-in guard"),
        }
        if let Some(path) = &self.config_path {
            log::info!("  Config: {}", path.display());
        }
    }
}
