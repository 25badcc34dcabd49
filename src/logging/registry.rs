// SPDX-License-Identifier: Apache-2.0 OR MIT
// Engine registry: ordered, lock-guarded list of active engines

use super::engine::LogEngine;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Handle returned by [`EngineRegistry::add`], used for removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineId(Uuid);

impl EngineId {
    /// Id of the default engine at index 0. Never removable.
    pub const SYSTEM: EngineId = EngineId(Uuid::nil());

    fn generate() -> Self {
        EngineId(Uuid::new_v4())
    }

    pub fn is_system(self) -> bool {
        self == Self::SYSTEM
    }
}

impl std::fmt::Display for EngineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Builds the default engine, on construction and on every reset
pub type DefaultEngineFactory = Box<dyn Fn() -> Arc<dyn LogEngine> + Send + Sync>;

struct Slot {
    id: EngineId,
    engine: Arc<dyn LogEngine>,
}

impl Clone for Slot {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            engine: Arc::clone(&self.engine),
        }
    }
}

/// Ordered collection of engines behind a single reader/writer lock
///
/// Index 0 always holds the default engine ([`EngineId::SYSTEM`]), so the
/// registry is never empty. Engine code is never run while the lock is
/// held; callers iterate over a [`snapshot`](Self::snapshot).
pub struct EngineRegistry {
    slots: RwLock<Vec<Slot>>,
    default_factory: DefaultEngineFactory,
}

impl EngineRegistry {
    /// Create a registry whose default engine is built by `factory`
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Arc<dyn LogEngine> + Send + Sync + 'static,
    {
        let default_factory: DefaultEngineFactory = Box::new(factory);
        let slots = vec![Slot {
            id: EngineId::SYSTEM,
            engine: default_factory(),
        }];
        Self {
            slots: RwLock::new(slots),
            default_factory,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Slot>> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Slot>> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an engine. Always succeeds.
    pub fn add(&self, engine: Arc<dyn LogEngine>) -> EngineId {
        let id = EngineId::generate();
        self.write().push(Slot { id, engine });
        id
    }

    /// Remove the engine at `index`
    ///
    /// Only `0 < index < count` is honored; anything else is a silent
    /// no-op returning `None`.
    pub fn remove_at(&self, index: usize) -> Option<EngineId> {
        let mut slots = self.write();
        if index == 0 || index >= slots.len() {
            return None;
        }
        Some(slots.remove(index).id)
    }

    /// Remove the engine registered under `id`
    ///
    /// Returns false for unknown ids and for [`EngineId::SYSTEM`].
    pub fn remove(&self, id: EngineId) -> bool {
        if id.is_system() {
            return false;
        }
        let mut slots = self.write();
        match slots.iter().position(|slot| slot.id == id) {
            Some(index) => {
                slots.remove(index);
                true
            }
            None => false,
        }
    }

    /// Point-in-time copy of the engine list, in registration order
    pub fn snapshot(&self) -> Vec<Arc<dyn LogEngine>> {
        self.read()
            .iter()
            .map(|slot| Arc::clone(&slot.engine))
            .collect()
    }

    /// Ids in registration order
    pub fn ids(&self) -> Vec<EngineId> {
        self.read().iter().map(|slot| slot.id).collect()
    }

    /// Number of registered engines (always at least 1)
    pub fn count(&self) -> usize {
        self.read().len()
    }

    pub fn contains(&self, id: EngineId) -> bool {
        self.read().iter().any(|slot| slot.id == id)
    }

    /// Discard every custom engine and install a fresh default engine
    pub fn reset(&self) {
        let fresh = vec![Slot {
            id: EngineId::SYSTEM,
            engine: (self.default_factory)(),
        }];
        let previous = std::mem::replace(&mut *self.write(), fresh);
        // Engines flush on drop; do that outside the lock.
        drop(previous);
    }
}

impl std::fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.read().clone();
        f.debug_list()
            .entries(
                slots
                    .iter()
                    .map(|slot| format!("{} ({})", slot.engine.name(), slot.id)),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Named(&'static str);

    impl LogEngine for Named {
        fn info(&self, _message: &str) {}
        fn warn(&self, _message: &str) {}
        fn error(&self, _message: &str) {}
        fn name(&self) -> &str {
            self.0
        }
    }

    fn registry() -> EngineRegistry {
        EngineRegistry::new(|| Arc::new(Named("system")))
    }

    fn names(registry: &EngineRegistry) -> Vec<String> {
        registry
            .snapshot()
            .iter()
            .map(|engine| engine.name().to_string())
            .collect()
    }

    #[test]
    fn test_starts_with_default_engine() {
        let registry = registry();
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.ids(), vec![EngineId::SYSTEM]);
        assert_eq!(names(&registry), vec!["system"]);
    }

    #[test]
    fn test_add_appends_in_order() {
        let registry = registry();
        let a = registry.add(Arc::new(Named("a")));
        let b = registry.add(Arc::new(Named("b")));

        assert_ne!(a, b);
        assert_eq!(registry.count(), 3);
        assert_eq!(names(&registry), vec!["system", "a", "b"]);
        assert_eq!(registry.ids(), vec![EngineId::SYSTEM, a, b]);
    }

    #[test]
    fn test_remove_at_bounds() {
        let registry = registry();
        let a = registry.add(Arc::new(Named("a")));
        registry.add(Arc::new(Named("b")));

        // Index 0 and out-of-range are silent no-ops
        assert_eq!(registry.remove_at(0), None);
        assert_eq!(registry.remove_at(3), None);
        assert_eq!(registry.remove_at(usize::MAX), None);
        assert_eq!(registry.count(), 3);

        assert_eq!(registry.remove_at(1), Some(a));
        assert_eq!(names(&registry), vec!["system", "b"]);
    }

    #[test]
    fn test_remove_by_id() {
        let registry = registry();
        let a = registry.add(Arc::new(Named("a")));
        let b = registry.add(Arc::new(Named("b")));

        assert!(registry.remove(a));
        assert!(!registry.remove(a), "second removal must be a no-op");
        assert!(!registry.remove(EngineId::SYSTEM));
        assert!(registry.contains(b));
        assert!(!registry.contains(a));
        assert_eq!(names(&registry), vec!["system", "b"]);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let registry = registry();
        registry.add(Arc::new(Named("a")));
        let snapshot = registry.snapshot();

        registry.add(Arc::new(Named("b")));
        registry.remove_at(1);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[1].name(), "a");
    }

    #[test]
    fn test_reset_rebuilds_default() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        let registry = EngineRegistry::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(Named("system"))
        });
        registry.add(Arc::new(Named("a")));
        registry.add(Arc::new(Named("b")));

        registry.reset();

        assert_eq!(registry.count(), 1);
        assert_eq!(registry.ids(), vec![EngineId::SYSTEM]);
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_concurrent_add_and_snapshot() {
        let registry = Arc::new(registry());
        let mut handles = Vec::new();

        for t in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(std::thread::spawn(move || {
                let mut ids = Vec::new();
                for _ in 0..50 {
                    ids.push(registry.add(Arc::new(Named("worker"))));
                    let snapshot = registry.ids();
                    assert_eq!(snapshot[0], EngineId::SYSTEM, "thread {}", t);
                    let mut dedup = snapshot.clone();
                    dedup.sort();
                    dedup.dedup();
                    assert_eq!(dedup.len(), snapshot.len(), "duplicate id in snapshot");
                }
                ids
            }));
        }

        let mut added = Vec::new();
        for handle in handles {
            added.extend(handle.join().unwrap());
        }

        assert_eq!(registry.count(), 1 + 8 * 50);
        for id in added {
            assert!(registry.contains(id));
        }
    }
}
