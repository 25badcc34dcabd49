//! Property-Based Tests: Engine Registry and Memory Engine
//!
//! Random sequences of registry operations are applied to an
//! `EngineRegistry` and to a plain `Vec` model side by side. After every
//! step the registry must agree with the model.
//!
//! # Coverage
//!
//! - **Default engine:** index 0 is always the default engine, whatever
//!   sequence of `add`, `remove_at`, `remove` and `reset` ran before.
//! - **Out-of-range removal:** `remove_at` past the end, or at index 0,
//!   changes nothing.
//! - **Bounded memory:** a memory engine with capacity N that receives
//!   N + k messages holds exactly the last N.

#[cfg(test)]
mod tests {
    use mologger::logging::MemoryEngine;
    use mologger::{EngineId, EngineRegistry, LogEngine, LoggingContext};
    use proptest::prelude::*;
    use std::sync::Arc;

    struct Null;

    impl LogEngine for Null {
        fn info(&self, _message: &str) {}
        fn warn(&self, _message: &str) {}
        fn error(&self, _message: &str) {}
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add,
        RemoveAt(usize),
        RemoveKnown(usize),
        Reset,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => Just(Op::Add),
            3 => (0usize..12).prop_map(Op::RemoveAt),
            2 => (0usize..12).prop_map(Op::RemoveKnown),
            1 => Just(Op::Reset),
        ]
    }

    proptest! {
        /// **Property:** The registry behaves like a list whose first slot
        /// cannot be removed.
        ///
        /// **Strategy:** Generate up to 64 operations and replay them on
        /// both the registry and a `Vec<EngineId>` model.
        #[test]
        fn test_registry_matches_model(ops in prop::collection::vec(op(), 0..64)) {
            let registry = EngineRegistry::new(|| Arc::new(Null));
            let mut model = vec![EngineId::SYSTEM];

            for op in ops {
                match op {
                    Op::Add => {
                        let id = registry.add(Arc::new(Null));
                        model.push(id);
                    }
                    Op::RemoveAt(index) => {
                        let removed = registry.remove_at(index);
                        if index == 0 || index >= model.len() {
                            prop_assert_eq!(removed, None);
                        } else {
                            prop_assert_eq!(removed, Some(model.remove(index)));
                        }
                    }
                    Op::RemoveKnown(pick) => {
                        let id = model[pick % model.len()];
                        let removed = registry.remove(id);
                        if id.is_system() {
                            prop_assert!(!removed);
                        } else {
                            prop_assert!(removed);
                            model.retain(|m| *m != id);
                        }
                    }
                    Op::Reset => {
                        registry.reset();
                        model.truncate(1);
                    }
                }

                prop_assert_eq!(registry.count(), model.len());
                prop_assert_eq!(registry.snapshot().len(), model.len());
                prop_assert_eq!(registry.ids(), model.clone());
                prop_assert!(registry.count() >= 1);
            }
        }

        /// **Property:** Removing a removed engine a second time is a no-op.
        #[test]
        fn test_double_remove_is_noop(adds in 1usize..8, pick in 0usize..8) {
            let registry = EngineRegistry::new(|| Arc::new(Null));
            let ids: Vec<EngineId> = (0..adds).map(|_| registry.add(Arc::new(Null))).collect();
            let id = ids[pick % ids.len()];

            prop_assert!(registry.remove(id));
            prop_assert!(!registry.remove(id));
            prop_assert_eq!(registry.count(), adds);
        }

        /// **Property:** A memory engine with capacity N holds exactly the
        /// last N of N + k messages, oldest first.
        #[test]
        fn test_memory_engine_keeps_last_n(capacity in 1usize..64, extra in 0usize..64) {
            let ctx = LoggingContext::with_default_engine(|| Arc::new(Null));
            let memory = Arc::new(MemoryEngine::new(capacity));
            ctx.add_engine(memory.clone());

            let total = capacity + extra;
            for i in 0..total {
                ctx.info(&format!("m{}", i));
            }

            let messages: Vec<String> = memory.entries().into_iter().map(|r| r.message).collect();
            let expected: Vec<String> = (extra..total).map(|i| format!("m{}", i)).collect();
            prop_assert_eq!(messages, expected);
            prop_assert_eq!(memory.evicted(), extra as u64);
        }
    }
}
