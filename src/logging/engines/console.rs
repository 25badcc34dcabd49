// SPDX-License-Identifier: Apache-2.0 OR MIT
// Console engine: the default system engine at registry index 0

use crate::logging::engine::{EngineError, EngineHealth, LogEngine};
use crate::logging::Severity;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::{Mutex, PoisonError};

/// Which severities the console engine writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleMode {
    /// Everything
    Verbose,
    /// Errors only, so crash-equivalent signals stay observable in release
    ErrorsOnly,
}

impl ConsoleMode {
    /// Verbose in debug builds, errors-only in release builds
    pub fn for_build() -> Self {
        if cfg!(debug_assertions) {
            ConsoleMode::Verbose
        } else {
            ConsoleMode::ErrorsOnly
        }
    }

    pub fn allows(self, severity: Severity) -> bool {
        match self {
            ConsoleMode::Verbose => true,
            ConsoleMode::ErrorsOnly => severity == Severity::Error,
        }
    }
}

impl Default for ConsoleMode {
    fn default() -> Self {
        Self::for_build()
    }
}

type Writer = Mutex<Box<dyn Write + Send>>;

/// Writes `"<timestamp> [LEVEL] message"` lines
///
/// Info and warn go to the standard stream, errors to the error stream.
pub struct ConsoleEngine {
    mode: ConsoleMode,
    out: Writer,
    err: Writer,
    health: EngineHealth,
}

impl ConsoleEngine {
    /// Console engine writing to stdout/stderr
    pub fn new(mode: ConsoleMode) -> Self {
        Self::with_writers(
            mode,
            Box::new(std::io::stdout()),
            Box::new(std::io::stderr()),
        )
    }

    /// Console engine writing to custom streams
    pub fn with_writers(
        mode: ConsoleMode,
        out: Box<dyn Write + Send>,
        err: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            mode,
            out: Mutex::new(out),
            err: Mutex::new(err),
            health: EngineHealth::new(),
        }
    }

    pub fn mode(&self) -> ConsoleMode {
        self.mode
    }

    pub fn health(&self) -> &EngineHealth {
        &self.health
    }

    fn write(&self, severity: Severity, message: &str) {
        if !self.mode.allows(severity) {
            return;
        }
        let stream = match severity {
            Severity::Error => &self.err,
            Severity::Info | Severity::Warn => &self.out,
        };
        let line = format!(
            "{} [{}] {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            severity,
            message
        );
        let mut stream = stream.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(stream, "{}", line) {
            self.health.record(self.name(), &EngineError::Io(e));
        }
    }
}

impl Default for ConsoleEngine {
    fn default() -> Self {
        Self::new(ConsoleMode::default())
    }
}

impl LogEngine for ConsoleEngine {
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
        "console"
    }

    fn flush(&self) {
        for stream in [&self.out, &self.err] {
            let mut stream = stream.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = stream.flush() {
                self.health.record("console", &EngineError::Io(e));
            }
        }
    }
}
