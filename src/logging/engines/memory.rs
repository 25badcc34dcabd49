// SPDX-License-Identifier: Apache-2.0 OR MIT
// In-memory engine: bounded FIFO of recent records

use crate::logging::engine::LogEngine;
use crate::logging::{LogRecord, Severity};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default capacity when none is configured
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Keeps the most recent `max_entries` records
///
/// Appending past capacity evicts exactly the oldest excess records
/// (circular-buffer semantics). Appends and reads go through one lock, so
/// a reader never observes a partially appended record.
pub struct MemoryEngine {
    entries: Mutex<VecDeque<LogRecord>>,
    max_entries: usize,
    evicted: AtomicU64,
}

impl MemoryEngine {
    /// Create a memory engine holding at most `max_entries` records
    ///
    /// A capacity of 0 is treated as 1.
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(max_entries.min(4096))),
            max_entries,
            evicted: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogRecord>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a record, evicting the oldest ones past capacity
    pub fn push(&self, record: LogRecord) {
        let mut entries = self.lock();
        entries.push_back(record);
        let excess = entries.len().saturating_sub(self.max_entries);
        if excess > 0 {
            entries.drain(..excess);
            self.evicted.fetch_add(excess as u64, Ordering::Relaxed);
        }
    }

    /// Snapshot of every retained record, oldest first
    pub fn entries(&self) -> Vec<LogRecord> {
        self.lock().iter().cloned().collect()
    }

    /// The `n` most recent records, oldest first
    pub fn recent(&self, n: usize) -> Vec<LogRecord> {
        let entries = self.lock();
        let skip = entries.len().saturating_sub(n);
        entries.iter().skip(skip).cloned().collect()
    }

    /// Retained records with exactly `severity`, oldest first
    pub fn by_level(&self, severity: Severity) -> Vec<LogRecord> {
        self.lock()
            .iter()
            .filter(|record| record.severity == severity)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Number of records dropped to stay within capacity
    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl LogEngine for MemoryEngine {
    fn info(&self, message: &str) {
        self.push(LogRecord::new(Severity::Info, message));
    }

    fn warn(&self, message: &str) {
        self.push(LogRecord::new(Severity::Warn, message));
    }

    fn error(&self, message: &str) {
        self.push(LogRecord::new(Severity::Error, message));
    }

    fn name(&self) -> &str {
        "memory"
    }
}
