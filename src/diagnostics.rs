// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Crash and hang diagnostics forwarding.
//!
//! The platform delivers diagnostic payloads on its own schedule (at once,
//! or batched daily). [`CrashReporter`] turns each payload into a single
//! log call: crashes become `crash` errors, hangs and resource exceptions
//! become `[Performance]` warnings. Payload contents are only inspected for
//! human-readable hints; nothing here is authoritative.

use crate::logging::{LoggingContext, Tag};
use serde::{Deserialize, Serialize};

/// Kind of diagnostic the platform reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    Crash,
    Hang,
    CpuException,
    DiskWrite,
}

impl DiagnosticKind {
    fn describe(self) -> &'static str {
        match self {
            DiagnosticKind::Crash => "App crashed",
            DiagnosticKind::Hang => "App hang detected",
            DiagnosticKind::CpuException => "CPU usage exception",
            DiagnosticKind::DiskWrite => "Excessive disk writes",
        }
    }
}

/// One diagnostic record as delivered by the platform subscriber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticPayload {
    pub kind: DiagnosticKind,
    pub timestamp: String,
    #[serde(default)]
    pub app_version: Option<String>,
    #[serde(default)]
    pub os_version: Option<String>,
    #[serde(default)]
    pub exception_type: Option<i64>,
    #[serde(default)]
    pub exception_code: Option<i64>,
    #[serde(default)]
    pub signal: Option<i32>,
    #[serde(default)]
    pub termination_reason: Option<String>,
    #[serde(default)]
    pub hang_duration_ms: Option<u64>,
    /// Opaque call-stack blob; only searched for hint substrings
    #[serde(default)]
    pub call_stack: serde_json::Value,
}

/// Failure to decode a payload
#[derive(Debug, thiserror::Error)]
pub enum DiagnosticError {
    #[error("malformed diagnostic payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl DiagnosticPayload {
    pub fn from_json(bytes: &[u8]) -> Result<Self, DiagnosticError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Best-effort explanation derived from signal, reason and stack text
    pub fn hint(&self) -> Option<&'static str> {
        if let Some(hint) = self.signal.and_then(signal_hint) {
            return Some(hint);
        }
        let mut haystack = String::new();
        if let Some(reason) = &self.termination_reason {
            haystack.push_str(reason);
            haystack.push('\n');
        }
        if !self.call_stack.is_null() {
            haystack.push_str(&self.call_stack.to_string());
        }
        text_hint(&haystack)
    }

    /// Human-readable one-line summary forwarded to the engines
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} at {} (app {}, os {})",
            self.kind.describe(),
            self.timestamp,
            self.app_version.as_deref().unwrap_or("unknown"),
            self.os_version.as_deref().unwrap_or("unknown"),
        );
        if let Some(signal) = self.signal {
            summary.push_str(&format!(", signal {}", signal_name(signal)));
        }
        if let Some(exception_type) = self.exception_type {
            summary.push_str(&format!(", exception type {}", exception_type));
        }
        if let Some(code) = self.exception_code {
            summary.push_str(&format!(", code {:#x}", code));
        }
        if let Some(duration) = self.hang_duration_ms {
            summary.push_str(&format!(", blocked for {}ms", duration));
        }
        if let Some(reason) = &self.termination_reason {
            summary.push_str(&format!(", reason: {}", reason));
        }
        if let Some(hint) = self.hint() {
            summary.push_str(&format!(" - hint: {}", hint));
        }
        summary
    }
}

fn signal_name(signal: i32) -> String {
    match signal {
        4 => "SIGILL".to_string(),
        5 => "SIGTRAP".to_string(),
        6 => "SIGABRT".to_string(),
        8 => "SIGFPE".to_string(),
        9 => "SIGKILL".to_string(),
        10 => "SIGBUS".to_string(),
        11 => "SIGSEGV".to_string(),
        other => other.to_string(),
    }
}

fn signal_hint(signal: i32) -> Option<&'static str> {
    match signal {
        10 | 11 => Some("invalid memory access"),
        6 => Some("abort, likely an assertion or uncaught exception"),
        5 | 4 => Some("runtime trap, likely a failed precondition"),
        8 => Some("arithmetic error"),
        9 => Some("killed by the system"),
        _ => None,
    }
}

const TEXT_HINTS: [(&str, &str); 8] = [
    ("8badf00d", "watchdog timeout"),
    ("EXC_BAD_ACCESS", "invalid memory access"),
    ("SIGSEGV", "invalid memory access"),
    ("EXC_CRASH", "abort, likely an assertion or uncaught exception"),
    ("SIGABRT", "abort, likely an assertion or uncaught exception"),
    ("Fatal error", "runtime trap, likely a failed precondition"),
    ("Unexpectedly found nil", "unwrapped a missing value"),
    ("Index out of range", "out-of-bounds access"),
];

fn text_hint(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    TEXT_HINTS
        .iter()
        .find(|(needle, _)| lowered.contains(&needle.to_lowercase()))
        .map(|(_, hint)| *hint)
}

/// Forwards diagnostic payloads into a [`LoggingContext`]
#[derive(Clone, Debug)]
pub struct CrashReporter {
    context: LoggingContext,
}

impl CrashReporter {
    pub fn new(context: LoggingContext) -> Self {
        Self { context }
    }

    /// Forward a decoded payload as one log call
    pub fn receive(&self, payload: &DiagnosticPayload) {
        let summary = payload.summary();
        match payload.kind {
            DiagnosticKind::Crash => self.context.crash(&summary),
            DiagnosticKind::Hang | DiagnosticKind::CpuException | DiagnosticKind::DiskWrite => {
                self.context.warn_tagged(Tag::Performance, &summary)
            }
        }
    }

    /// Decode and forward a JSON payload
    ///
    /// An undecodable payload is still reported, as a crash error saying it
    /// could not be decoded.
    pub fn receive_json(&self, bytes: &[u8]) {
        match DiagnosticPayload::from_json(bytes) {
            Ok(payload) => self.receive(&payload),
            Err(e) => self.report_undecodable(&e),
        }
    }

    /// Decode and forward a JSON array of payloads
    ///
    /// Elements are decoded independently; a bad element does not stop the
    /// rest. Returns the number of payloads forwarded successfully.
    pub fn receive_batch(&self, bytes: &[u8]) -> usize {
        let items: Vec<serde_json::Value> = match serde_json::from_slice(bytes) {
            Ok(items) => items,
            Err(e) => {
                self.report_undecodable(&DiagnosticError::from(e));
                return 0;
            }
        };
        let mut forwarded = 0;
        for item in items {
            match serde_json::from_value::<DiagnosticPayload>(item) {
                Ok(payload) => {
                    self.receive(&payload);
                    forwarded += 1;
                }
                Err(e) => self.report_undecodable(&DiagnosticError::from(e)),
            }
        }
        forwarded
    }

    fn report_undecodable(&self, error: &DiagnosticError) {
        self.context.crash(&format!(
            "Diagnostic payload received but unable to decode: {}",
            error
        ));
    }
}
