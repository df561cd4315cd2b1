//! Identifiers for pooled templates and spawned instances

use core::fmt;
use core::hash::{Hash, Hasher};
use core::sync::atomic::{AtomicU64, Ordering};
use serde::{Deserialize, Serialize};

/// FNV-1a over the bytes of a name
const fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf29ce484222325u64;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(0x100000001b3);
        i += 1;
    }
    hash
}

/// A unique instance identifier with a generation counter
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Id {
    /// Lower 32 bits: index, Upper 32 bits: generation
    bits: u64,
}

impl Id {
    /// Create a new ID from index and generation
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self {
            bits: (generation as u64) << 32 | index as u64,
        }
    }

    #[inline]
    pub const fn index(&self) -> u32 {
        self.bits as u32
    }

    #[inline]
    pub const fn generation(&self) -> u32 {
        (self.bits >> 32) as u32
    }
}

impl Hash for Id {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits.hash(state);
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({}v{})", self.index(), self.generation())
    }
}

/// Thread-safe ID generator
///
/// Spawned instances take their identity from here so that callers can tell
/// a reused instance apart from a freshly created one.
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// Generate the next unique ID
    pub fn next(&self) -> Id {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        Id::new(index as u32, (index >> 32) as u32)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// A string identifier that stays the same for the lifetime of a template
///
/// Pools are keyed by this: two templates with the same stable name share a
/// container. Equality and hashing go through the precomputed FNV hash plus
/// the name, so lookups stay cheap on hot paths.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct StableId {
    name: Box<str>,
    hash: u64,
}

impl StableId {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            hash: fnv1a(name.as_bytes()),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the precomputed hash
    #[inline]
    pub fn hash_value(&self) -> u64 {
        self.hash
    }
}

impl PartialEq for StableId {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.name == other.name
    }
}

impl Eq for StableId {}

impl Hash for StableId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl fmt::Debug for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StableId({:?})", self.name)
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for StableId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StableId {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<StableId> for String {
    fn from(id: StableId) -> Self {
        id.name.into_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_id_creation() {
        let id = Id::new(42, 7);
        assert_eq!(id.index(), 42);
        assert_eq!(id.generation(), 7);
        assert_eq!(format!("{:?}", id), "Id(42v7)");
    }

    #[test]
    fn test_id_generator() {
        let gen = IdGenerator::new();
        let id1 = gen.next();
        let id2 = gen.next();
        assert_ne!(id1, id2);
        assert_eq!(id1.index(), 0);
        assert_eq!(id2.index(), 1);
    }

    #[test]
    fn test_stable_id_is_stable() {
        let a = StableId::new("bullet");
        let b = StableId::from(String::from("bullet"));
        assert_eq!(a, b);
        assert_eq!(a.hash_value(), b.hash_value());
        assert_ne!(a, StableId::new("rocket"));

        let mut map = HashMap::new();
        map.insert(a, 1);
        assert_eq!(map.get(&StableId::new("bullet")), Some(&1));
    }

    #[test]
    fn test_stable_id_serde() {
        let id = StableId::new("loot_crate");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"loot_crate\"");
        let back: StableId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
