//! Pool manager - one container per template key

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use strike_core::{FrameTime, Scheduler, StableId, TaskToken};

use crate::pool::{AllocatorPolicy, PoolContainer, PoolStats, SharedTemplate};
use crate::settings::PoolSettings;
use crate::{Poolable, Template};

/// Pool manager shared between several owners
pub type SharedPoolManager<I> = Arc<Mutex<PoolManager<I>>>;

/// Keyed object-reuse cache
///
/// Every operation on an unknown key is a soft failure: `None`, `false` or a
/// no-op. Callers hold the manager by `&mut`, which keeps structural changes
/// on the single update thread.
pub struct PoolManager<I: Poolable> {
    containers: HashMap<StableId, PoolContainer<I>>,
    settings: PoolSettings,
}

impl<I: Poolable> PoolManager<I> {
    pub fn new() -> Self {
        Self::with_settings(PoolSettings::default())
    }

    pub fn with_settings(settings: PoolSettings) -> Self {
        Self {
            containers: HashMap::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    /// Wrap in a mutex for shared ownership
    pub fn into_shared(self) -> SharedPoolManager<I> {
        Arc::new(Mutex::new(self))
    }

    /// Create a pre-populated container for `template`
    ///
    /// A missing template is a no-op. An existing container for the same key is
    /// kept untouched. Returns true if a container was created.
    pub fn create_container(
        &mut self,
        template: Option<SharedTemplate<I>>,
        policy: AllocatorPolicy,
        capacity: usize,
    ) -> bool {
        let Some(template) = template else {
            return false;
        };

        let key = template.stable_id();
        if self.containers.contains_key(&key) {
            log::warn!("Pool '{}' already exists, keeping the existing container", key);
            return false;
        }

        log::debug!("Created pool '{}' ({:?}, capacity {})", key, policy, capacity);
        let container = PoolContainer::new(key.clone(), Some(template), policy, capacity);
        self.containers.insert(key, container);
        true
    }

    /// Create a container using the configured policy and capacity for its key
    pub fn create_container_with_settings(&mut self, template: SharedTemplate<I>) -> bool {
        let resolved = self.settings.resolve(&template.stable_id());
        self.create_container(Some(template), resolved.policy, resolved.capacity)
    }

    fn lazy_container(&mut self, key: &StableId) -> &mut PoolContainer<I> {
        let settings = &self.settings;
        self.containers.entry(key.clone()).or_insert_with(|| {
            let resolved = settings.resolve(key);
            log::debug!(
                "Lazily created pool '{}' ({:?}, capacity {})",
                key,
                resolved.policy,
                resolved.capacity
            );
            PoolContainer::new(key.clone(), None, resolved.policy, resolved.capacity)
        })
    }

    /// Pop an instance from an existing container
    pub fn pop(&mut self, key: &StableId) -> Option<I> {
        self.containers.get_mut(key)?.pop()
    }

    /// Pop from the template's container, creating it on demand
    pub fn pop_or_create(&mut self, template: &SharedTemplate<I>) -> Option<I> {
        let key = template.stable_id();
        if !self.containers.contains_key(&key) {
            let resolved = self.settings.resolve(&key);
            log::debug!(
                "Lazily created pool '{}' ({:?}, capacity {})",
                key,
                resolved.policy,
                resolved.capacity
            );
            let container = PoolContainer::new(
                key.clone(),
                Some(template.clone()),
                resolved.policy,
                resolved.capacity,
            );
            self.containers.insert(key.clone(), container);
        }

        let container = self.containers.get_mut(&key)?;
        container.adopt_template(template.clone());
        container.pop()
    }

    /// Return an instance to its pool. Returns false if it was destroyed.
    pub fn push(&mut self, instance: I) -> bool {
        let key = instance.pool_key().clone();
        self.lazy_container(&key).push(instance)
    }

    /// Push `instance` back `delay` seconds after `time`
    pub fn push_after(
        scheduler: &mut Scheduler<Self>,
        time: &FrameTime,
        instance: I,
        delay: f32,
    ) -> TaskToken
    where
        I: 'static,
    {
        scheduler.schedule_after(time, delay, move |pools: &mut Self| {
            pools.push(instance);
        })
    }

    pub fn try_peek(&self, key: &StableId) -> Option<&I> {
        self.containers.get(key)?.try_peek()
    }

    /// Resize an existing container and switch its policy
    pub fn reallocate(&mut self, key: &StableId, policy: AllocatorPolicy, capacity: usize) -> bool {
        match self.containers.get_mut(key) {
            Some(container) => {
                log::debug!(
                    "Reallocating pool '{}': {:?}/{} -> {:?}/{}",
                    key,
                    container.policy(),
                    container.capacity(),
                    policy,
                    capacity
                );
                container.reallocate(policy, capacity);
                true
            }
            None => false,
        }
    }

    /// Destroy the container's available instances and forget the key
    ///
    /// Instances that are currently popped are not tracked by the container
    /// and survive this call.
    pub fn remove_container(&mut self, key: &StableId) -> bool {
        match self.containers.remove(key) {
            Some(mut container) => {
                let destroyed = container.destroy_all();
                let outstanding = container.outstanding();
                if outstanding > 0 {
                    log::warn!(
                        "Removed pool '{}' with {} instances still in use (not destroyed)",
                        key,
                        outstanding
                    );
                } else {
                    log::debug!("Removed pool '{}', destroyed {} instances", key, destroyed);
                }
                true
            }
            None => false,
        }
    }

    pub fn contains_container(&self, key: &StableId) -> bool {
        self.containers.contains_key(key)
    }

    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    pub fn stats(&self, key: &StableId) -> Option<PoolStats> {
        self.containers.get(key).map(PoolContainer::stats)
    }

    pub fn keys(&self) -> impl Iterator<Item = &StableId> {
        self.containers.keys()
    }

    /// Tear everything down (scene shutdown)
    pub fn clear(&mut self) {
        let count = self.containers.len();
        for (_, mut container) in self.containers.drain() {
            container.destroy_all();
        }
        if count > 0 {
            log::debug!("Cleared {} pools", count);
        }
    }
}

impl<I: Poolable> Default for PoolManager<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Poolable> Drop for PoolManager<I> {
    fn drop(&mut self) {
        self.clear();
    }
}
