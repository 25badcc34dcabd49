// SPDX-License-Identifier: Apache-2.0 OR MIT
// Engine contract shared by every log destination

use super::Severity;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Destination for dispatched log messages
///
/// Messages arrive fully rendered (tag prefix already applied). Methods
/// return nothing and must not block the caller for long: engines that do
/// I/O hand the work to their own background thread. Internal failures are
/// recorded in an [`EngineHealth`] and never surface to the caller.
pub trait LogEngine: Send + Sync {
    fn info(&self, message: &str);

    fn warn(&self, message: &str);

    fn error(&self, message: &str);

    /// Short identifier used in metrics labels and diagnostics
    fn name(&self) -> &str {
        "engine"
    }

    /// Route a message to the method matching `severity`
    fn log(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => self.info(message),
            Severity::Warn => self.warn(message),
            Severity::Error => self.error(message),
        }
    }

    /// Push out anything buffered. Blocks until done.
    fn flush(&self) {}
}

/// Failures contained inside an engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failure: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("background worker is not running")]
    WorkerStopped,
}

/// Failure bookkeeping for a single engine
///
/// Engines call [`EngineHealth::record`] instead of propagating errors.
/// Each failure also bumps `mologger_engine_failures_total{engine=...}`.
#[derive(Debug, Default)]
pub struct EngineHealth {
    failures: AtomicU64,
    last_error: Mutex<Option<String>>,
}

impl EngineHealth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a contained failure
    pub fn record(&self, engine: &str, error: &EngineError) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(error.to_string());
        metrics::counter!("mologger_engine_failures_total", "engine" => engine.to_string())
            .increment(1);
    }

    /// Number of failures since creation
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Description of the most recent failure, if any
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Recording {
        calls: Mutex<Vec<(Severity, String)>>,
    }

    impl LogEngine for Recording {
        fn info(&self, message: &str) {
            self.calls
                .lock()
                .unwrap()
                .push((Severity::Info, message.to_string()));
        }

        fn warn(&self, message: &str) {
            self.calls
                .lock()
                .unwrap()
                .push((Severity::Warn, message.to_string()));
        }

        fn error(&self, message: &str) {
            self.calls
                .lock()
                .unwrap()
                .push((Severity::Error, message.to_string()));
        }
    }

    #[test]
    fn test_log_routes_by_severity() {
        let engine = Recording {
            calls: Mutex::new(Vec::new()),
        };
        engine.log(Severity::Info, "a");
        engine.log(Severity::Warn, "b");
        engine.log(Severity::Error, "c");

        let calls = engine.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                (Severity::Info, "a".to_string()),
                (Severity::Warn, "b".to_string()),
                (Severity::Error, "c".to_string()),
            ]
        );
    }

    #[test]
    fn test_default_name_and_flush() {
        let engine: Arc<dyn LogEngine> = Arc::new(Recording {
            calls: Mutex::new(Vec::new()),
        });
        assert_eq!(engine.name(), "engine");
        engine.flush();
    }

    #[test]
    fn test_health_records_failures() {
        let health = EngineHealth::new();
        assert_eq!(health.failures(), 0);
        assert!(health.last_error().is_none());

        health.record("file", &EngineError::Transport("refused".to_string()));
        health.record("file", &EngineError::WorkerStopped);

        assert_eq!(health.failures(), 2);
        assert_eq!(
            health.last_error().as_deref(),
            Some("background worker is not running")
        );
    }
}
