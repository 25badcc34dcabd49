// SPDX-License-Identifier: Apache-2.0 OR MIT
// Analytics engine: running counters and promoted events

use crate::logging::engine::LogEngine;
use crate::logging::Severity;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Keywords that promote an info message to a tracked event by default
pub const DEFAULT_PROMOTE_KEYWORDS: [&str; 2] = ["slow", "performance"];

/// An info message promoted for analytics
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedEvent {
    pub timestamp: DateTime<Utc>,
    pub keyword: String,
    pub message: String,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub infos: u64,
    pub warnings: u64,
    pub errors: u64,
    pub tracked_events: u64,
}

/// Counts messages per severity and tracks noteworthy info messages
///
/// Counters only grow until [`MetricsEngine::reset`]. Every update is also
/// reported through the `metrics` facade so an installed recorder (for
/// example the Prometheus exporter) sees it.
pub struct MetricsEngine {
    infos: AtomicU64,
    warnings: AtomicU64,
    errors: AtomicU64,
    keywords: Vec<String>,
    events: Mutex<Vec<TrackedEvent>>,
}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::with_keywords(DEFAULT_PROMOTE_KEYWORDS)
    }

    /// Promote info messages containing any of `keywords` (case-insensitive)
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            infos: AtomicU64::new(0),
            warnings: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            events: Mutex::new(Vec::new()),
        }
    }

    fn events(&self) -> MutexGuard<'_, Vec<TrackedEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn count(&self, severity: Severity) {
        let counter = match severity {
            Severity::Info => &self.infos,
            Severity::Warn => &self.warnings,
            Severity::Error => &self.errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("mologger_messages_total", "level" => severity.as_label()).increment(1);
    }

    fn promote(&self, message: &str) {
        let lowered = message.to_lowercase();
        let Some(keyword) = self.keywords.iter().find(|k| lowered.contains(k.as_str())) else {
            return;
        };
        self.events().push(TrackedEvent {
            timestamp: Utc::now(),
            keyword: keyword.clone(),
            message: message.to_string(),
        });
        ::metrics::counter!("mologger_tracked_events_total").increment(1);
    }

    pub fn error_count(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn warning_count(&self) -> u64 {
        self.warnings.load(Ordering::Relaxed)
    }

    pub fn info_count(&self) -> u64 {
        self.infos.load(Ordering::Relaxed)
    }

    pub fn tracked_events(&self) -> Vec<TrackedEvent> {
        self.events().clone()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            infos: self.info_count(),
            warnings: self.warning_count(),
            errors: self.error_count(),
            tracked_events: self.events().len() as u64,
        }
    }

    /// Zero every counter and forget tracked events
    pub fn reset(&self) {
        self.infos.store(0, Ordering::Relaxed);
        self.warnings.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
        self.events().clear();
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LogEngine for MetricsEngine {
    fn info(&self, message: &str) {
        self.count(Severity::Info);
        self.promote(message);
    }

    fn warn(&self, _message: &str) {
        self.count(Severity::Warn);
    }

    fn error(&self, _message: &str) {
        self.count(Severity::Error);
    }

    fn name(&self) -> &str {
        "metrics"
    }
}
