// SPDX-License-Identifier: Apache-2.0 OR MIT
// File engine: JSON lines appended by a background worker, size-rotated

use crate::logging::engine::{EngineError, EngineHealth, LogEngine};
use crate::logging::{LogRecord, Severity};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

/// Default rotation threshold: 5 MiB
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

enum Command {
    Write(LogRecord),
    Flush(Sender<()>),
}

/// Appends one JSON object per line to a file
///
/// Writes happen on a dedicated thread so `info`/`warn`/`error` return
/// immediately. Before each append the worker checks the file size; past
/// `max_bytes` the file is renamed to `<path>.old` (replacing any previous
/// backup) and a fresh file is started.
pub struct FileEngine {
    path: PathBuf,
    sender: Mutex<Option<Sender<Command>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    health: Arc<EngineHealth>,
}

impl FileEngine {
    /// Open (or create) `path` for appending and start the writer thread
    pub fn open(path: impl AsRef<Path>, max_bytes: u64) -> Result<Self, EngineError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let writer = RotatingWriter::open(path.clone(), max_bytes)?;
        let health = Arc::new(EngineHealth::new());
        let (sender, receiver) = mpsc::channel();

        let worker_health = Arc::clone(&health);
        let worker = std::thread::Builder::new()
            .name("mologger-file".to_string())
            .spawn(move || run_worker(writer, receiver, &worker_health))?;

        Ok(Self {
            path,
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
            health,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the single rotated backup
    pub fn backup_path(&self) -> PathBuf {
        backup_path_for(&self.path)
    }

    pub fn health(&self) -> &EngineHealth {
        &self.health
    }

    fn send(&self, command: Command) -> bool {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        let delivered = sender
            .as_ref()
            .map(|s| s.send(command).is_ok())
            .unwrap_or(false);
        if !delivered {
            self.health.record(self.name(), &EngineError::WorkerStopped);
        }
        delivered
    }

    fn append(&self, severity: Severity, message: &str) {
        self.send(Command::Write(LogRecord::new(severity, message)));
    }
}

impl LogEngine for FileEngine {
    fn info(&self, message: &str) {
        self.append(Severity::Info, message);
    }

    fn warn(&self, message: &str) {
        self.append(Severity::Warn, message);
    }

    fn error(&self, message: &str) {
        self.append(Severity::Error, message);
    }

    fn name(&self) -> &str {
        "file"
    }

    fn flush(&self) {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.send(Command::Flush(ack_tx)) {
            // Err means the worker exited; nothing left to wait for
            let _ = ack_rx.recv();
        }
    }
}

impl Drop for FileEngine {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain and exit
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            let _ = worker.join();
        }
    }
}

fn run_worker(mut writer: RotatingWriter, receiver: Receiver<Command>, health: &EngineHealth) {
    while let Ok(command) = receiver.recv() {
        match command {
            Command::Write(record) => {
                if writer.needs_rotation() {
                    // A failed rotation keeps appending to the live file
                    if let Err(e) = writer.rotate() {
                        health.record("file", &e);
                    }
                }
                if let Err(e) = writer.append(&record) {
                    health.record("file", &e);
                }
            }
            Command::Flush(ack) => {
                if let Err(e) = writer.flush() {
                    health.record("file", &e);
                }
                let _ = ack.send(());
            }
        }
    }
    if let Err(e) = writer.flush() {
        health.record("file", &e);
    }
}

fn backup_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".old");
    PathBuf::from(name)
}

/// Append-only writer that rotates to a single `.old` backup
struct RotatingWriter {
    path: PathBuf,
    max_bytes: u64,
    file: BufWriter<File>,
    size: u64,
}

impl RotatingWriter {
    fn open(path: PathBuf, max_bytes: u64) -> Result<Self, EngineError> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            path,
            max_bytes,
            file: BufWriter::new(file),
            size,
        })
    }

    fn needs_rotation(&self) -> bool {
        self.size > self.max_bytes
    }

    fn append(&mut self, record: &LogRecord) -> Result<(), EngineError> {
        let mut line = record.to_json_line()?;
        line.push('\n');
        self.file.write_all(line.as_bytes())?;
        self.size += line.len() as u64;
        Ok(())
    }

    fn rotate(&mut self) -> Result<(), EngineError> {
        self.file.flush()?;
        // rename replaces an existing backup on every supported platform
        let backup = backup_path_for(&self.path);
        std::fs::rename(&self.path, &backup)?;
        match OpenOptions::new().create(true).append(true).open(&self.path) {
            Ok(file) => {
                self.file = BufWriter::new(file);
                self.size = 0;
                Ok(())
            }
            Err(e) => {
                // Put the live file back so the current handle stays at `path`
                let _ = std::fs::rename(&backup, &self.path);
                Err(e.into())
            }
        }
    }

    fn flush(&mut self) -> Result<(), EngineError> {
        self.file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_log_path(prefix: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("mologger_test_{}_{}", prefix, Uuid::new_v4()))
            .join("app.log")
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    fn read_records(path: &Path) -> Vec<LogRecord> {
        std::fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(|line| LogRecord::from_json_line(line).unwrap())
            .collect()
    }

    #[test]
    fn test_appends_json_lines() {
        let path = temp_log_path("append");
        let engine = FileEngine::open(&path, DEFAULT_MAX_BYTES).unwrap();

        engine.info("first");
        engine.warn("second");
        engine.error("third");
        engine.flush();

        let records = read_records(&path);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].message, "first");
        assert_eq!(records[1].severity, Severity::Warn);
        assert_eq!(records[2].severity, Severity::Error);
        assert_eq!(engine.health().failures(), 0);

        drop(engine);
        cleanup(&path);
    }

    #[test]
    fn test_drop_drains_queue() {
        let path = temp_log_path("drop");
        let engine = FileEngine::open(&path, DEFAULT_MAX_BYTES).unwrap();
        for i in 0..100 {
            engine.info(&format!("message {}", i));
        }
        drop(engine);

        assert_eq!(read_records(&path).len(), 100);
        cleanup(&path);
    }

    #[test]
    fn test_rotation_keeps_single_backup() {
        let path = temp_log_path("rotate");
        // Tiny threshold: every line after the first forces a rotation check
        let engine = FileEngine::open(&path, 200).unwrap();
        let backup = engine.backup_path();

        for i in 0..20 {
            engine.info(&format!("rotation message number {:02}", i));
        }
        engine.flush();

        let current = read_records(&path);
        let previous = read_records(&backup);
        assert!(!current.is_empty());
        assert!(!previous.is_empty());
        // The newest message is always in the live file
        assert_eq!(current.last().unwrap().message, "rotation message number 19");
        // Only one backup generation exists
        let siblings = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(siblings, 2);
        assert!(backup.to_string_lossy().ends_with("app.log.old"));

        drop(engine);
        cleanup(&path);
    }

    #[test]
    fn test_failed_rotation_keeps_writing_live_file() {
        let path = temp_log_path("blocked_backup");
        // A non-empty directory where the backup belongs makes every rename fail
        let blocker = backup_path_for(&path).join("keep");
        std::fs::create_dir_all(&blocker).unwrap();
        let engine = FileEngine::open(&path, 50).unwrap();

        for i in 0..10 {
            engine.info(&format!("record {}", i));
        }
        engine.flush();

        let messages: Vec<_> = read_records(&path).into_iter().map(|r| r.message).collect();
        let expected: Vec<_> = (0..10).map(|i| format!("record {}", i)).collect();
        assert_eq!(messages, expected);
        assert!(engine.health().failures() >= 1);
        assert!(engine.health().last_error().is_some());
        assert!(blocker.is_dir());

        drop(engine);
        cleanup(&path);
    }

    #[test]
    fn test_appends_to_existing_file() {
        let path = temp_log_path("existing");
        {
            let engine = FileEngine::open(&path, DEFAULT_MAX_BYTES).unwrap();
            engine.info("before restart");
        }
        {
            let engine = FileEngine::open(&path, DEFAULT_MAX_BYTES).unwrap();
            engine.info("after restart");
        }

        let messages: Vec<_> = read_records(&path).into_iter().map(|r| r.message).collect();
        assert_eq!(messages, vec!["before restart", "after restart"]);
        cleanup(&path);
    }
}
