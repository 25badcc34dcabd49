// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Configuration file types and parsing.
//!
//! JSON5 configuration format supporting:
//! - Which engines to register and how to size them
//! - The runtime debug-logging switch (overridable via `MOLOGGER_DEBUG`)
//! - Comments and trailing commas

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::logging::engines::{
    DEFAULT_BATCH_SIZE, DEFAULT_MAX_BYTES, DEFAULT_MAX_ENTRIES, DEFAULT_PROMOTE_KEYWORDS,
};
use crate::logging::{
    BatchEngine, BatchOptions, ConsoleEngine, ConsoleMode, DebugEngine, EngineError, FileEngine,
    LoggingContext, MemoryEngine, MetricsEngine, TcpTransport,
};

/// Environment variable overriding `debug_logging_enabled`
pub const DEBUG_ENV_VAR: &str = "MOLOGGER_DEBUG";

/// Logging configuration (JSON5 file format)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LoggingConfig {
    /// Enables `debug`/`debug_tagged` dispatch
    #[serde(default)]
    pub debug_logging_enabled: bool,

    /// Console (default engine) mode; build-dependent when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console_mode: Option<ConsoleMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<BatchConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsConfig>,

    /// Register the verbose debug engine (writes while debug logging is on)
    #[serde(default)]
    pub debug_engine: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileConfig {
    pub path: PathBuf,
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchConfig {
    /// `host:port` receiving newline-delimited JSON batches
    pub endpoint: SocketAddr,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Optional timer flush; size-triggered only when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flush_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsConfig {
    #[serde(default = "default_promote_keywords")]
    pub promote_keywords: Vec<String>,
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

fn default_max_bytes() -> u64 {
    DEFAULT_MAX_BYTES
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_promote_keywords() -> Vec<String> {
    DEFAULT_PROMOTE_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

impl LoggingConfig {
    /// Load configuration from a JSON5 file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to a JSON5-compatible string
    pub fn to_json5(&self) -> String {
        // json5 has no pretty printer; plain JSON is valid JSON5
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Apply the `MOLOGGER_DEBUG` environment override, if set
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        match std::env::var(DEBUG_ENV_VAR) {
            Ok(value) => {
                self.debug_logging_enabled = parse_flag(&value)?;
                Ok(())
            }
            Err(_) => Ok(()),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(memory) = &self.memory {
            if memory.max_entries == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "memory.max_entries",
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        if let Some(file) = &self.file {
            if file.path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "file.path",
                    reason: "path cannot be empty".to_string(),
                });
            }
            if file.max_bytes == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "file.max_bytes",
                    reason: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(batch) = &self.batch {
            if batch.batch_size == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "batch.batch_size",
                    reason: "must be at least 1".to_string(),
                });
            }
            if batch.flush_interval_ms == Some(0) {
                return Err(ConfigError::InvalidValue {
                    field: "batch.flush_interval_ms",
                    reason: "must be greater than 0 when set".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Build a context with every configured engine registered
    ///
    /// Engines are added after the console engine in a fixed order:
    /// memory, file, batch, metrics, debug.
    pub fn build_context(&self) -> Result<BuiltContext, ConfigError> {
        self.validate()?;

        let console_mode = self.console_mode.unwrap_or_default();
        let context =
            LoggingContext::with_default_engine(move || Arc::new(ConsoleEngine::new(console_mode)));
        context.set_debug_logging(self.debug_logging_enabled);

        let mut built = BuiltContext {
            context,
            memory: None,
            metrics: None,
        };

        if let Some(memory) = &self.memory {
            let engine = Arc::new(MemoryEngine::new(memory.max_entries));
            built.context.add_engine(engine.clone());
            built.memory = Some(engine);
        }
        if let Some(file) = &self.file {
            let engine = FileEngine::open(&file.path, file.max_bytes)
                .map_err(|e| ConfigError::Engine("file", e))?;
            built.context.add_engine(Arc::new(engine));
        }
        if let Some(batch) = &self.batch {
            let options = BatchOptions {
                batch_size: batch.batch_size,
                flush_interval: batch.flush_interval_ms.map(Duration::from_millis),
            };
            let engine = BatchEngine::new(TcpTransport::new(batch.endpoint), options)
                .map_err(|e| ConfigError::Engine("batch", e))?;
            built.context.add_engine(Arc::new(engine));
        }
        if let Some(metrics) = &self.metrics {
            let engine = Arc::new(MetricsEngine::with_keywords(&metrics.promote_keywords));
            built.context.add_engine(engine.clone());
            built.metrics = Some(engine);
        }
        if self.debug_engine {
            built
                .context
                .add_engine(Arc::new(DebugEngine::new(self.debug_logging_enabled)));
        }

        Ok(built)
    }
}

/// A configured context plus handles to engines callers may want to query
pub struct BuiltContext {
    pub context: LoggingContext,
    pub memory: Option<Arc<MemoryEngine>>,
    pub metrics: Option<Arc<MetricsEngine>>,
}

fn parse_flag(value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            field: DEBUG_ENV_VAR,
            reason: format!("'{}' is not a boolean", other),
        }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {reason}", path.display())]
    Io { path: PathBuf, reason: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to start {0} engine: {1}")]
    Engine(&'static str, #[source] EngineError),
}
