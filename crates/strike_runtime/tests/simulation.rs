//! Integration tests for the simulation runtime
//!
//! Runs whole scenarios end to end:
//! - The built-in skirmish preset
//! - Config and graph files loaded from disk
//! - Setup errors surfaced before the first frame

use std::fs;

use approx::assert_relative_eq;
use strike_runtime::{RuntimeError, SimConfig, World};
use tempfile::TempDir;

const AMBUSH_GRAPH: &str = r#"{
    "initial": "idle",
    "behaviours": [
        { "name": "idle", "transitions": [
            { "next": "hurt", "conditions": [{ "kind": "on_take_damage" }] }
        ]},
        { "name": "hurt", "transitions": [
            { "next": "idle", "conditions": [
                { "kind": "elapsed_time", "params": { "seconds": 0.25 } }
            ]}
        ]}
    ]
}"#;

fn write_scenario(dir: &TempDir, graph: &str) -> std::path::PathBuf {
    let graph_path = dir.path().join("ambush.json");
    fs::write(&graph_path, graph).expect("Write graph");

    let config_path = dir.path().join("strike.toml");
    let config = format!(
        r#"
        graph = "{}"

        [sim]
        frames = 60
        delta_time = 0.05

        [[agents]]
        name = "sentry"
        health = 80.0

        [[script]]
        frame = 3
        agent = "sentry"
        action = {{ kind = "damage", amount = 20.0 }}
        "#,
        graph_path.display().to_string().replace('\\', "/")
    );
    fs::write(&config_path, config).expect("Write config");
    config_path
}

#[test]
fn test_skirmish_preset() {
    let config = SimConfig::skirmish();
    let mut world = World::from_config(&config).expect("Skirmish should build");
    let summary = world.run(config.sim.frames);

    let guard = &summary.agents[0];
    assert_eq!(guard.behaviour.as_deref(), Some("flee"));
    assert_relative_eq!(guard.health, 10.0);
    // patrol, chase, attack, flee
    assert_eq!(guard.switches, 4);

    assert!(summary.stats.shots_fired > 0);
    assert_eq!(summary.stats.dry_fires, 0);

    let bullets = &summary.pools[0];
    assert_eq!(bullets.key, "bullet");
    assert_eq!(bullets.capacity, 8);
    assert_eq!(bullets.outstanding, 0);
    assert_eq!(bullets.available, 8);
    assert_eq!(bullets.created, 8);
}

#[test]
fn test_scenario_from_files() {
    let dir = TempDir::new().expect("Temp dir");
    let config_path = write_scenario(&dir, AMBUSH_GRAPH);

    let config = SimConfig::load_from_file(&config_path).expect("Config should load");
    assert_eq!(config.config_path.as_deref(), Some(config_path.as_path()));
    assert_eq!(config.sim.frames, 60);

    let mut world = World::from_config(&config).expect("World should build");
    for _ in 0..3 {
        world.step();
    }
    let sentry = world.agent("sentry").expect("Sentry");
    assert_eq!(sentry.machine.active_name(), Some("hurt"));
    assert_relative_eq!(sentry.agent.health, 60.0);

    let summary = world.run(10);
    assert_eq!(summary.agents[0].behaviour.as_deref(), Some("idle"));
    assert_eq!(summary.stats.frames, 13);
}

#[test]
fn test_missing_graph_file() {
    let dir = TempDir::new().expect("Temp dir");
    let mut config = SimConfig::default();
    config.graph = Some(dir.path().join("nowhere.json"));

    assert!(matches!(World::from_config(&config), Err(RuntimeError::Io { .. })));
}

#[test]
fn test_broken_graph_rejected() {
    let dir = TempDir::new().expect("Temp dir");
    let broken = AMBUSH_GRAPH.replace(r#""next": "idle""#, r#""next": "sleep""#);
    let config_path = write_scenario(&dir, &broken);

    let config = SimConfig::load_from_file(&config_path).expect("Config should load");
    assert!(matches!(World::from_config(&config), Err(RuntimeError::Graph(_))));
}
