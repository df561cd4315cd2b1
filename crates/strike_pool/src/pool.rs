//! Pool container - per-template stack of reusable instances

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strike_core::StableId;

use crate::{Poolable, Template};

/// Shared handle to the template instances are created from
pub type SharedTemplate<I> = Arc<dyn Template<I>>;

/// What a container does when `pop` finds the stack empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocatorPolicy {
    /// Create a new instance and grow capacity by one
    Free,
    /// Report exhaustion; nothing is created
    Fixed,
    /// Create a new instance, capacity stays a soft target
    Dynamic,
}

impl Default for AllocatorPolicy {
    fn default() -> Self {
        Self::Free
    }
}

/// Pool statistics
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolStats {
    pub policy: AllocatorPolicy,
    pub capacity: usize,
    pub available: usize,
    /// Instances popped and not pushed back yet
    pub outstanding: usize,
    pub created: u64,
    pub destroyed: u64,
}

/// A keyed stack of inactive instances plus the template that makes more
///
/// `available.len() <= capacity` is only enforced on `push`; `pop` may hand
/// out more instances than `capacity` depending on the policy.
pub struct PoolContainer<I: Poolable> {
    key: StableId,
    /// Top of the stack is the end of the vector
    available: Vec<I>,
    template: Option<SharedTemplate<I>>,
    policy: AllocatorPolicy,
    capacity: usize,
    outstanding: usize,
    created: u64,
    destroyed: u64,
}

impl<I: Poolable> PoolContainer<I> {
    /// Create a container and pre-populate it with `capacity` dormant instances
    pub fn new(
        key: StableId,
        template: Option<SharedTemplate<I>>,
        policy: AllocatorPolicy,
        capacity: usize,
    ) -> Self {
        let mut container = Self {
            key,
            available: Vec::with_capacity(capacity),
            template,
            policy,
            capacity,
            outstanding: 0,
            created: 0,
            destroyed: 0,
        };
        container.fill_to_capacity();
        container
    }

    fn instantiate(&mut self) -> Option<I> {
        let template = self.template.as_ref()?;
        let instance = template.instantiate();
        self.created += 1;
        Some(instance)
    }

    fn destroy(&mut self, instance: I) {
        self.destroyed += 1;
        instance.destroy();
    }

    fn fill_to_capacity(&mut self) {
        while self.available.len() < self.capacity {
            match self.instantiate() {
                Some(mut instance) => {
                    instance.set_active(false);
                    self.available.push(instance);
                }
                None => break,
            }
        }
    }

    pub fn key(&self) -> &StableId {
        &self.key
    }

    pub fn policy(&self) -> AllocatorPolicy {
        self.policy
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of instances ready to be popped
    pub fn available(&self) -> usize {
        self.available.len()
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn has_template(&self) -> bool {
        self.template.is_some()
    }

    /// Adopt a template if the container was created without one
    pub fn adopt_template(&mut self, template: SharedTemplate<I>) {
        if self.template.is_none() {
            self.template = Some(template);
        }
    }

    /// Take the most recently pushed instance, or make one per policy
    pub fn pop(&mut self) -> Option<I> {
        let mut instance = match self.available.pop() {
            Some(instance) => instance,
            None => match self.policy {
                AllocatorPolicy::Fixed => {
                    log::trace!("Pool '{}' exhausted (fixed capacity {})", self.key, self.capacity);
                    return None;
                }
                AllocatorPolicy::Free => {
                    let instance = self.instantiate()?;
                    self.capacity += 1;
                    log::trace!("Pool '{}' grew to capacity {}", self.key, self.capacity);
                    instance
                }
                AllocatorPolicy::Dynamic => self.instantiate()?,
            },
        };

        instance.set_active(true);
        self.outstanding += 1;
        Some(instance)
    }

    /// Return an instance. Returns false if the pool was full and it was destroyed.
    pub fn push(&mut self, mut instance: I) -> bool {
        instance.set_active(false);
        self.outstanding = self.outstanding.saturating_sub(1);

        if self.available.len() < self.capacity {
            self.available.push(instance);
            true
        } else {
            log::trace!("Pool '{}' full, destroying returned instance", self.key);
            self.destroy(instance);
            false
        }
    }

    /// Look at the next instance `pop` would return
    pub fn try_peek(&self) -> Option<&I> {
        self.available.last()
    }

    /// Change policy and capacity together, destroying or creating dormant
    /// instances so that the stack matches the new capacity
    pub fn reallocate(&mut self, policy: AllocatorPolicy, capacity: usize) {
        self.policy = policy;
        self.capacity = capacity;

        if self.available.len() > capacity {
            let excess = self.available.len() - capacity;
            // Oldest entries sit at the bottom of the stack
            let removed: Vec<I> = self.available.drain(..excess).collect();
            for instance in removed {
                self.destroy(instance);
            }
        } else {
            self.fill_to_capacity();
        }
    }

    /// Destroy every available instance. Returns how many were destroyed.
    pub fn destroy_all(&mut self) -> usize {
        let removed: Vec<I> = self.available.drain(..).collect();
        let count = removed.len();
        for instance in removed {
            self.destroy(instance);
        }
        count
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            policy: self.policy,
            capacity: self.capacity,
            available: self.available.len(),
            outstanding: self.outstanding,
            created: self.created,
            destroyed: self.destroyed,
        }
    }
}

impl<I: Poolable> Drop for PoolContainer<I> {
    fn drop(&mut self) {
        self.destroy_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{probe_template, Probe};

    #[test]
    fn test_prewarmed_instances_are_dormant() {
        let (template, counters) = probe_template("bullet");
        let container =
            PoolContainer::new("bullet".into(), Some(template), AllocatorPolicy::Fixed, 3);

        assert_eq!(container.available(), 3);
        assert_eq!(counters.created(), 3);
        assert!(!container.try_peek().unwrap().active);
    }

    #[test]
    fn test_fixed_exhaustion() {
        let (template, _) = probe_template("bullet");
        let mut container =
            PoolContainer::new("bullet".into(), Some(template), AllocatorPolicy::Fixed, 2);

        let a = container.pop().unwrap();
        let b = container.pop().unwrap();
        assert!(a.active && b.active);
        assert!(container.pop().is_none());
        assert_eq!(container.capacity(), 2);
        assert_eq!(container.outstanding(), 2);
    }

    #[test]
    fn test_free_grows_capacity() {
        let (template, counters) = probe_template("shell");
        let mut container =
            PoolContainer::new("shell".into(), Some(template), AllocatorPolicy::Free, 1);

        let first = container.pop().unwrap();
        let second = container.pop().unwrap();
        assert_eq!(container.capacity(), 2);

        assert!(container.push(first));
        assert!(container.push(second));
        assert_eq!(counters.destroyed(), 0);
        assert_eq!(container.available(), 2);
    }

    #[test]
    fn test_dynamic_keeps_capacity() {
        let (template, counters) = probe_template("spark");
        let mut container =
            PoolContainer::new("spark".into(), Some(template), AllocatorPolicy::Dynamic, 1);

        let a = container.pop().unwrap();
        let b = container.pop().unwrap();
        assert_eq!(container.capacity(), 1);

        assert!(container.push(a));
        assert!(!container.push(b));
        assert_eq!(counters.destroyed(), 1);
    }

    #[test]
    fn test_pop_without_template() {
        let mut container: PoolContainer<Probe> =
            PoolContainer::new("orphan".into(), None, AllocatorPolicy::Free, 1);

        assert_eq!(container.available(), 0);
        assert!(container.pop().is_none());
        assert_eq!(container.capacity(), 1);
    }

    #[test]
    fn test_reallocate_shrinks_oldest_first() {
        let (template, counters) = probe_template("crate");
        let mut container =
            PoolContainer::new("crate".into(), Some(template), AllocatorPolicy::Fixed, 4);
        let newest = container.try_peek().unwrap().id;

        container.reallocate(AllocatorPolicy::Dynamic, 1);

        assert_eq!(container.available(), 1);
        assert_eq!(container.policy(), AllocatorPolicy::Dynamic);
        assert_eq!(container.try_peek().unwrap().id, newest);
        assert_eq!(counters.destroyed(), 3);
    }

    #[test]
    fn test_reallocate_grows_dormant() {
        let (template, counters) = probe_template("crate");
        let mut container =
            PoolContainer::new("crate".into(), Some(template), AllocatorPolicy::Fixed, 1);

        container.reallocate(AllocatorPolicy::Fixed, 5);

        assert_eq!(container.available(), 5);
        assert_eq!(counters.created(), 5);
        assert!(!container.try_peek().unwrap().active);
    }
}
