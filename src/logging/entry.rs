// SPDX-License-Identifier: Apache-2.0 OR MIT
// Log record: one rendered message plus the metadata engines persist

use super::Severity;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// A single log call, as retained by engines that keep history
///
/// The dispatcher never stores records; engines that persist or buffer
/// messages build one per call with [`LogRecord::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "level")]
    pub severity: Severity,
    pub message: String,
    pub thread: String,
}

impl LogRecord {
    /// Create a record stamped with the current time and thread
    pub fn new(severity: Severity, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            message: message.to_string(),
            thread: current_thread_label(),
        }
    }

    /// Serialize as a single JSON object (no trailing newline)
    ///
    /// Field order is fixed: `timestamp`, `level`, `message`, `thread`.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a line previously produced by [`LogRecord::to_json_line`]
    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Name of the current thread, falling back to its id
pub(crate) fn current_thread_label() -> String {
    let thread = std::thread::current();
    match thread.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", thread.id()),
    }
}
