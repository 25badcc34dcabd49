// Debug engine: verbose developer output behind a runtime switch

use crate::logging::engine::{EngineError, EngineHealth, LogEngine};
use crate::logging::entry::current_thread_label;
use crate::logging::Severity;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Writes `"[DEBUG] +<ms>ms <thread> LEVEL message"` while enabled
///
/// Elapsed time is measured from engine creation.
pub struct DebugEngine {
    enabled: AtomicBool,
    started: Instant,
    writer: Mutex<Box<dyn Write + Send>>,
    health: EngineHealth,
}

impl DebugEngine {
    /// Debug engine writing to stderr
    pub fn new(enabled: bool) -> Self {
        Self::with_writer(enabled, Box::new(std::io::stderr()))
    }

    pub fn with_writer(enabled: bool, writer: Box<dyn Write + Send>) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            started: Instant::now(),
            writer: Mutex::new(writer),
            health: EngineHealth::new(),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn health(&self) -> &EngineHealth {
        &self.health
    }

    fn write(&self, severity: Severity, message: &str) {
        if !self.is_enabled() {
            return;
        }
        let elapsed = self.started.elapsed().as_millis();
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(
            writer,
            "[DEBUG] +{}ms {} {} {}",
            elapsed,
            current_thread_label(),
            severity,
            message
        ) {
            self.health.record("debug", &EngineError::Io(e));
        }
    }
}

impl LogEngine for DebugEngine {
    fn info(&self, message: &str) {
        self.write(Severity::Info, message);
    }

    fn warn(&self, message: &str) {
        self.write(Severity::Warn, message);
    }

    fn error(&self, message: &str) {
        self.write(Severity::Error, message);
    }

    fn name(&self) -> &str {
        "debug"
    }

    fn flush(&self) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writer.flush() {
            self.health.record("debug", &EngineError::Io(e));
        }
    }
}
