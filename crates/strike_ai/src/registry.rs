//! Condition registry - builds conditions from a kind name and JSON parameters

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::condition::Condition;
use crate::conditions::{
    ElapsedTimeCondition, FieldOfViewFindCondition, FieldOfViewLostCondition,
    HealthCompareCondition, OnTakeDamageCondition, TargetDistanceCondition,
};
use crate::error::{GraphError, Result};

/// Builds a condition from its parameters
pub type ConditionFactory = Box<dyn Fn(&Value) -> Result<Box<dyn Condition>> + Send + Sync>;

/// Maps condition kinds to factories
pub struct ConditionRegistry {
    factories: BTreeMap<String, ConditionFactory>,
}

impl ConditionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with every built-in condition
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register_params::<HealthCompareCondition>("health_compare")
            .register_params::<OnTakeDamageCondition>("on_take_damage")
            .register_params::<FieldOfViewFindCondition>("fov_find")
            .register_params::<FieldOfViewLostCondition>("fov_lost")
            .register_params::<ElapsedTimeCondition>("elapsed_time")
            .register_params::<TargetDistanceCondition>("target_distance");
        registry
    }

    /// Register a factory, replacing any previous one for `kind`
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&Value) -> Result<Box<dyn Condition>> + Send + Sync + 'static,
    {
        let kind = kind.into();
        if self.factories.insert(kind.clone(), Box::new(factory)).is_some() {
            log::debug!("Replaced condition factory '{}'", kind);
        }
        self
    }

    /// Register a condition whose parameters deserialize straight into it
    pub fn register_params<C>(&mut self, kind: &str) -> &mut Self
    where
        C: Condition + DeserializeOwned + 'static,
    {
        let name = kind.to_string();
        self.register(kind, move |params| {
            let condition: C =
                serde_json::from_value(params.clone()).map_err(|e| GraphError::InvalidParams {
                    kind: name.clone(),
                    message: e.to_string(),
                })?;
            Ok(Box::new(condition) as Box<dyn Condition>)
        })
    }

    /// Build a condition. Missing (`null`) parameters are treated as `{}`.
    pub fn create(&self, kind: &str, params: &Value) -> Result<Box<dyn Condition>> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| GraphError::UnknownCondition(kind.to_string()))?;

        if params.is_null() {
            factory(&Value::Object(Default::default()))
        } else {
            factory(params)
        }
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered kinds in sorted order
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for ConditionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtins_registered() {
        let registry = ConditionRegistry::default();
        let kinds: Vec<_> = registry.kinds().collect();
        assert_eq!(
            kinds,
            vec![
                "elapsed_time",
                "fov_find",
                "fov_lost",
                "health_compare",
                "on_take_damage",
                "target_distance",
            ]
        );
    }

    #[test]
    fn test_create_with_params() {
        let registry = ConditionRegistry::with_builtins();
        let condition = registry
            .create("health_compare", &json!({ "comparison": "less", "value": 20.0 }))
            .unwrap();
        assert_eq!(condition.kind(), "health_compare");

        let pulse = registry.create("on_take_damage", &Value::Null).unwrap();
        assert_eq!(pulse.kind(), "on_take_damage");
    }

    #[test]
    fn test_unknown_kind() {
        let registry = ConditionRegistry::with_builtins();
        assert!(matches!(
            registry.create("teleport", &Value::Null),
            Err(GraphError::UnknownCondition(kind)) if kind == "teleport"
        ));
    }

    #[test]
    fn test_invalid_params() {
        let registry = ConditionRegistry::with_builtins();
        let params = json!({ "comparison": "sideways", "value": 1.0 });
        let result = registry.create("health_compare", &params);
        assert!(matches!(result, Err(GraphError::InvalidParams { .. })));
    }

    #[test]
    fn test_custom_factory() {
        let mut registry = ConditionRegistry::new();
        registry.register("never", |_| {
            Ok(Box::new(ElapsedTimeCondition::new(f32::MAX)) as Box<dyn Condition>)
        });

        assert!(registry.contains("never"));
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains("fov_find"));
    }
}
