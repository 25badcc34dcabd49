//! Multi-engine logging facade.
//!
//! A [`LoggingContext`] fans every log call out to the engines registered
//! in its [`EngineRegistry`]: console, memory, file, batched network,
//! metrics and debug engines ship with the crate, and any type
//! implementing [`LogEngine`] can be added. [`CrashReporter`] forwards
//! platform crash/hang diagnostics through the same context.

pub mod config;
pub mod diagnostics;
pub mod exporter;
#[macro_use]
pub mod logging;

pub use config::{BuiltContext, ConfigError, LoggingConfig};
pub use diagnostics::{CrashReporter, DiagnosticPayload};
pub use logging::{
    EngineId, EngineRegistry, LogEngine, LogRecord, LoggingContext, Severity, Tag, TagGroup,
    TaggedLogger, TaggedLogging,
};
