//! Registry of live relation identifiers.
//!
//! Every table reserves a uniquely named relation here at construction and
//! releases it when dropped, so no two live tables share a backing relation.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use rand::Rng;

/// Prefix of every generated relation name.
pub const RELATION_PREFIX: &str = "tmp_table_";

/// Numeric suffix range of generated relation names.
const SUFFIX_RANGE: std::ops::RangeInclusive<u32> = 1_000_000..=9_999_999;

static GLOBAL: OnceLock<Arc<RelationRegistry>> = OnceLock::new();

/// Tracks relation identifiers held by live tables.
#[derive(Debug, Default)]
pub struct RelationRegistry {
    live: Mutex<HashSet<String>>,
}

impl RelationRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by tables that are not given one.
    pub fn global() -> Arc<Self> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::new())))
    }

    /// Reserve a fresh relation name using the thread-local RNG.
    pub fn reserve(&self) -> String {
        self.reserve_with(&mut rand::thread_rng())
    }

    /// Reserve a fresh relation name, drawing suffixes from `rng`.
    ///
    /// Draws until the name collides with no live identifier. Generation and
    /// insertion happen under one lock.
    pub fn reserve_with<R: Rng>(&self, rng: &mut R) -> String {
        let mut live = self.lock();
        loop {
            let name = format!("{RELATION_PREFIX}{}", rng.gen_range(SUFFIX_RANGE));
            if live.insert(name.clone()) {
                tracing::trace!(relation = %name, "Reserved relation name");
                return name;
            }
        }
    }

    /// Release a name. Returns whether it was live.
    pub fn release(&self, name: &str) -> bool {
        self.lock().remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    /// Number of live identifiers.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // The set stays consistent even if a holder panicked.
        self.live.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_reserve_release() {
        let registry = RelationRegistry::new();
        let name = registry.reserve();

        assert!(name.starts_with(RELATION_PREFIX));
        let suffix: u32 = name[RELATION_PREFIX.len()..].parse().unwrap();
        assert!(SUFFIX_RANGE.contains(&suffix));
        assert!(registry.contains(&name));
        assert_eq!(registry.len(), 1);

        assert!(registry.release(&name));
        assert!(!registry.release(&name));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_collision_retries() {
        let registry = RelationRegistry::new();

        // Same seed, same first draw: the second reservation must skip it.
        let first = registry.reserve_with(&mut StdRng::seed_from_u64(7));
        let second = registry.reserve_with(&mut StdRng::seed_from_u64(7));

        assert_ne!(first, second);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_concurrent_reservations_are_unique() {
        let registry = Arc::new(RelationRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || (0..50).map(|_| registry.reserve()).collect::<Vec<_>>())
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            for name in handle.join().unwrap() {
                assert!(all.insert(name), "duplicate relation name");
            }
        }
        assert_eq!(registry.len(), 400);
    }

    #[test]
    fn test_global_is_shared() {
        assert!(Arc::ptr_eq(&RelationRegistry::global(), &RelationRegistry::global()));
    }
}
