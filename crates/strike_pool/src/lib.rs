//! # strike_pool - Object Pools
//!
//! Reuse of short-lived objects (projectiles, spawned props, loot) instead of
//! creating and destroying them every time:
//! - `PoolContainer`: LIFO stack of dormant instances for one template
//! - `PoolManager`: one container per template key
//! - `AllocatorPolicy`: Free, Fixed or Dynamic behaviour on exhaustion
//!
//! ```ignore
//! use strike_pool::prelude::*;
//!
//! let bullets = FnTemplate::shared("bullet", Bullet::new);
//! let mut pools = PoolManager::new();
//! pools.create_container(Some(bullets), AllocatorPolicy::Fixed, 32);
//!
//! if let Some(bullet) = pools.pop(&StableId::new("bullet")) {
//!     // ... fly, hit, then
//!     pools.push(bullet);
//! }
//! ```

use std::sync::Arc;

use strike_core::StableId;

pub mod manager;
pub mod pool;
pub mod settings;

pub use manager::{PoolManager, SharedPoolManager};
pub use pool::{AllocatorPolicy, PoolContainer, PoolStats, SharedTemplate};
pub use settings::{ContainerSettings, PoolSettings};

/// The prototype that pooled instances are created from
pub trait Template<I>: Send + Sync {
    /// Key of the pool this template feeds. Must not change over time.
    fn stable_id(&self) -> StableId;

    /// Create a new instance. Pools deactivate it before storing it.
    fn instantiate(&self) -> I;
}

/// An object that can live in a pool
pub trait Poolable: Send {
    /// Key of the pool this instance belongs to
    fn pool_key(&self) -> &StableId;

    /// Called with `true` when handed out and `false` when stored
    fn set_active(&mut self, active: bool);

    /// Called instead of a plain drop when the pool discards the instance
    fn destroy(self)
    where
        Self: Sized,
    {
    }
}

/// Template backed by a closure
pub struct FnTemplate<F> {
    id: StableId,
    factory: F,
}

impl<F> FnTemplate<F> {
    pub fn new(id: impl Into<StableId>, factory: F) -> Self {
        Self {
            id: id.into(),
            factory,
        }
    }
}

impl<F> FnTemplate<F> {
    /// Build a shared template ready for `create_container`
    pub fn shared<I>(id: impl Into<StableId>, factory: F) -> SharedTemplate<I>
    where
        F: Fn() -> I + Send + Sync + 'static,
        I: 'static,
    {
        Arc::new(Self::new(id, factory))
    }
}

impl<I, F> Template<I> for FnTemplate<F>
where
    F: Fn() -> I + Send + Sync,
{
    fn stable_id(&self) -> StableId {
        self.id.clone()
    }

    fn instantiate(&self) -> I {
        (self.factory)()
    }
}

pub mod prelude {
    pub use crate::{
        AllocatorPolicy, FnTemplate, PoolContainer, PoolManager, PoolSettings, PoolStats, Poolable,
        SharedPoolManager, SharedTemplate, Template,
    };
    pub use strike_core::StableId;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use strike_core::{Id, IdGenerator};

    #[derive(Default)]
    pub struct Counters {
        ids: IdGenerator,
        created: AtomicUsize,
        destroyed: AtomicUsize,
    }

    impl Counters {
        pub fn created(&self) -> usize {
            self.created.load(Ordering::SeqCst)
        }

        pub fn destroyed(&self) -> usize {
            self.destroyed.load(Ordering::SeqCst)
        }
    }

    pub struct Probe {
        pub id: Id,
        pub key: StableId,
        pub active: bool,
        counters: Arc<Counters>,
    }

    impl Poolable for Probe {
        fn pool_key(&self) -> &StableId {
            &self.key
        }

        fn set_active(&mut self, active: bool) {
            self.active = active;
        }

        fn destroy(self) {
            self.counters.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Template whose instances report creation and destruction
    pub fn probe_template(name: &str) -> (SharedTemplate<Probe>, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let key = StableId::new(name);
        let shared = counters.clone();
        let template = FnTemplate::shared(name, move || {
            shared.created.fetch_add(1, Ordering::SeqCst);
            Probe {
                id: shared.ids.next(),
                key: key.clone(),
                active: true,
                counters: shared.clone(),
            }
        });
        (template, counters)
    }
}
