//! # strike_runtime - Headless Simulation Runtime
//!
//! Runs agents driven by behaviour graphs against a scripted timeline,
//! with projectiles served from keyed pools. Used by the `strike-sim`
//! binary and by integration tests.

pub mod agent;
pub mod config;
pub mod error;
pub mod world;

pub use agent::{Agent, Projectile, Target};
pub use config::{AgentConfig, ScriptAction, ScriptedEvent, SimConfig, SimSettings, WeaponConfig};
pub use error::{Result, RuntimeError};
pub use world::{SimStats, SimSummary, World};
