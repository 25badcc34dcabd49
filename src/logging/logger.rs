// SPDX-License-Identifier: Apache-2.0 OR MIT
// LoggingContext: the dispatcher application code logs through

use super::engine::LogEngine;
use super::registry::{EngineId, EngineRegistry};
use super::tagged::TaggedLogger;
use super::{Severity, Tag};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

struct Shared {
    registry: EngineRegistry,
    debug_logging_enabled: AtomicBool,
    isolated_failures: AtomicU64,
}

/// Fan-out dispatcher over an [`EngineRegistry`]
///
/// This is a lightweight handle that can be cloned and passed to every
/// component that logs. Each call snapshots the registry and invokes the
/// matching method on every engine, in registration order, on the calling
/// thread. A panicking engine is isolated: later engines still receive the
/// message.
#[derive(Clone)]
pub struct LoggingContext {
    shared: Arc<Shared>,
}

impl LoggingContext {
    /// Create a context around an existing registry
    pub fn new(registry: EngineRegistry) -> Self {
        Self {
            shared: Arc::new(Shared {
                registry,
                debug_logging_enabled: AtomicBool::new(false),
                isolated_failures: AtomicU64::new(0),
            }),
        }
    }

    /// Create a context whose default engine is built by `factory`
    pub fn with_default_engine<F>(factory: F) -> Self
    where
        F: Fn() -> Arc<dyn LogEngine> + Send + Sync + 'static,
    {
        Self::new(EngineRegistry::new(factory))
    }

    /// Dispatch an already rendered message to every engine
    pub fn log(&self, severity: Severity, message: &str) {
        let engines = self.shared.registry.snapshot();
        for engine in &engines {
            self.deliver(engine.as_ref(), severity, message);
        }
    }

    fn deliver(&self, engine: &dyn LogEngine, severity: Severity, message: &str) {
        let outcome = catch_unwind(AssertUnwindSafe(|| engine.log(severity, message)));
        if outcome.is_err() {
            self.shared.isolated_failures.fetch_add(1, Ordering::Relaxed);
            metrics::counter!(
                "mologger_engine_panics_total",
                "engine" => engine.name().to_string()
            )
            .increment(1);
            eprintln!(
                "mologger: engine '{}' panicked while handling a {} message; continuing",
                engine.name(),
                severity
            );
        }
    }

    /// Dispatch `message` with `tag`'s label prepended
    pub fn log_tagged(&self, severity: Severity, tag: Tag, message: &str) {
        self.log(severity, &tag.apply(message));
    }

    #[inline]
    pub fn info(&self, message: &str) {
        self.log(Severity::Info, message);
    }

    #[inline]
    pub fn warn(&self, message: &str) {
        self.log(Severity::Warn, message);
    }

    #[inline]
    pub fn error(&self, message: &str) {
        self.log(Severity::Error, message);
    }

    #[inline]
    pub fn info_tagged(&self, tag: Tag, message: &str) {
        self.log_tagged(Severity::Info, tag, message);
    }

    #[inline]
    pub fn warn_tagged(&self, tag: Tag, message: &str) {
        self.log_tagged(Severity::Warn, tag, message);
    }

    #[inline]
    pub fn error_tagged(&self, tag: Tag, message: &str) {
        self.log_tagged(Severity::Error, tag, message);
    }

    /// Error with the crash tag prepended
    pub fn crash(&self, message: &str) {
        self.log_tagged(Severity::Error, Tag::Crash, message);
    }

    /// Info with the debug tag; dropped unless debug logging is enabled
    pub fn debug(&self, message: &str) {
        self.debug_tagged(Tag::Debug, message);
    }

    /// Info with `tag`; dropped unless debug logging is enabled
    pub fn debug_tagged(&self, tag: Tag, message: &str) {
        if self.debug_logging_enabled() {
            self.log_tagged(Severity::Info, tag, message);
        }
    }

    pub fn set_debug_logging(&self, enabled: bool) {
        self.shared
            .debug_logging_enabled
            .store(enabled, Ordering::Relaxed);
    }

    pub fn debug_logging_enabled(&self) -> bool {
        self.shared.debug_logging_enabled.load(Ordering::Relaxed)
    }

    /// Number of engine panics contained so far
    pub fn isolated_failures(&self) -> u64 {
        self.shared.isolated_failures.load(Ordering::Relaxed)
    }

    /// Get a handle that applies `tag` to every message
    pub fn tagged(&self, tag: Tag) -> TaggedLogger {
        TaggedLogger::new(self.clone(), tag)
    }

    pub fn registry(&self) -> &EngineRegistry {
        &self.shared.registry
    }

    pub fn add_engine(&self, engine: Arc<dyn LogEngine>) -> EngineId {
        self.shared.registry.add(engine)
    }

    pub fn remove_engine(&self, id: EngineId) -> bool {
        self.shared.registry.remove(id)
    }

    pub fn remove_engine_at(&self, index: usize) -> Option<EngineId> {
        self.shared.registry.remove_at(index)
    }

    pub fn engine_count(&self) -> usize {
        self.shared.registry.count()
    }

    /// Restore the registry to its single default engine
    pub fn reset(&self) {
        self.shared.registry.reset();
    }

    /// Flush every registered engine, isolating panics like dispatch does
    pub fn flush(&self) {
        for engine in self.shared.registry.snapshot() {
            if catch_unwind(AssertUnwindSafe(|| engine.flush())).is_err() {
                self.shared.isolated_failures.fetch_add(1, Ordering::Relaxed);
                eprintln!("mologger: engine '{}' panicked during flush", engine.name());
            }
        }
    }
}

impl std::fmt::Debug for LoggingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingContext")
            .field("engines", &self.shared.registry)
            .field("debug_logging_enabled", &self.debug_logging_enabled())
            .finish()
    }
}
