//! Pool configuration

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strike_core::StableId;

use crate::pool::AllocatorPolicy;

/// Policy and capacity for one container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSettings {
    pub policy: AllocatorPolicy,
    pub capacity: usize,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            policy: AllocatorPolicy::Free,
            capacity: 1,
        }
    }
}

/// Manager-wide pool configuration
///
/// `default_*` apply to containers created lazily by `push`/`pop_or_create`
/// and to `create_container_with_settings` when the key has no override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Policy for containers without an override
    pub default_policy: AllocatorPolicy,
    /// Capacity for containers without an override
    pub default_capacity: usize,
    /// Per-template settings
    pub overrides: HashMap<StableId, ContainerSettings>,
}

impl Default for PoolSettings {
    fn default() -> Self {
        let defaults = ContainerSettings::default();
        Self {
            default_policy: defaults.policy,
            default_capacity: defaults.capacity,
            overrides: HashMap::new(),
        }
    }
}

impl PoolSettings {
    /// Settings for a burst-heavy scene: dynamic pools with a larger soft target
    pub fn burst(capacity: usize) -> Self {
        Self {
            default_policy: AllocatorPolicy::Dynamic,
            default_capacity: capacity,
            ..Default::default()
        }
    }

    pub fn with_override(
        mut self,
        key: impl Into<StableId>,
        policy: AllocatorPolicy,
        capacity: usize,
    ) -> Self {
        self.overrides.insert(key.into(), ContainerSettings { policy, capacity });
        self
    }

    /// Settings that apply to `key`
    pub fn resolve(&self, key: &StableId) -> ContainerSettings {
        self.overrides.get(key).copied().unwrap_or(ContainerSettings {
            policy: self.default_policy,
            capacity: self.default_capacity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        let settings = PoolSettings::default().with_override("rocket", AllocatorPolicy::Fixed, 8);

        let rocket = settings.resolve(&StableId::new("rocket"));
        assert_eq!(rocket.policy, AllocatorPolicy::Fixed);
        assert_eq!(rocket.capacity, 8);

        let other = settings.resolve(&StableId::new("bullet"));
        assert_eq!(other, ContainerSettings::default());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{
            "default_policy": "dynamic",
            "overrides": { "grenade": { "policy": "fixed", "capacity": 2 } }
        }"#;
        let settings: PoolSettings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.default_policy, AllocatorPolicy::Dynamic);
        assert_eq!(settings.default_capacity, 1);
        assert_eq!(
            settings.resolve(&StableId::new("grenade")).policy,
            AllocatorPolicy::Fixed
        );
    }

    #[test]
    fn test_burst_preset() {
        let settings = PoolSettings::burst(16);
        assert_eq!(settings.default_policy, AllocatorPolicy::Dynamic);
        assert_eq!(settings.default_capacity, 16);
    }
}
