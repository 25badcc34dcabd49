// SPDX-License-Identifier: Apache-2.0 OR MIT
// Batched network engine: buffer records, ship them as one unit

use crate::logging::engine::{EngineError, EngineHealth, LogEngine};
use crate::logging::{LogRecord, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::net::{SocketAddr, TcpStream};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 50;

/// One shipment of buffered records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPayload {
    pub sent_at: DateTime<Utc>,
    pub count: usize,
    pub entries: Vec<LogRecord>,
}

impl BatchPayload {
    pub fn new(entries: Vec<LogRecord>) -> Self {
        Self {
            sent_at: Utc::now(),
            count: entries.len(),
            entries,
        }
    }
}

/// Delivers a batch somewhere. Called from the engine's worker thread.
///
/// Fire-and-forget: a failed send is recorded and the batch is dropped.
pub trait BatchTransport: Send + 'static {
    fn send(&mut self, payload: &BatchPayload) -> Result<(), EngineError>;
}

/// Sends each batch as one JSON document plus newline over a fresh TCP
/// connection
pub struct TcpTransport {
    endpoint: SocketAddr,
    timeout: Duration,
}

impl TcpTransport {
    pub fn new(endpoint: SocketAddr) -> Self {
        Self {
            endpoint,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl BatchTransport for TcpTransport {
    fn send(&mut self, payload: &BatchPayload) -> Result<(), EngineError> {
        let mut body = serde_json::to_vec(payload)?;
        body.push(b'\n');
        let mut stream = TcpStream::connect_timeout(&self.endpoint, self.timeout)
            .map_err(|e| EngineError::Transport(format!("connect {}: {}", self.endpoint, e)))?;
        stream.set_write_timeout(Some(self.timeout))?;
        stream.write_all(&body)?;
        stream.flush()?;
        Ok(())
    }
}

enum Command {
    Send(Vec<LogRecord>),
    Flush(Sender<()>),
}

/// Batching settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Flush once this many records are buffered
    pub batch_size: usize,
    /// Also flush whatever is buffered at this interval
    pub flush_interval: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: None,
        }
    }
}

type Buffer = Arc<Mutex<Vec<LogRecord>>>;

fn lock(buffer: &Buffer) -> MutexGuard<'_, Vec<LogRecord>> {
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Accumulates records and hands full batches to a [`BatchTransport`]
///
/// Sending happens on a worker thread. The buffer is flushed when it
/// reaches `batch_size`, on the optional timer, on [`LogEngine::flush`],
/// and when the engine is dropped.
pub struct BatchEngine {
    buffer: Buffer,
    batch_size: usize,
    sender: Mutex<Option<Sender<Command>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    health: Arc<EngineHealth>,
}

impl BatchEngine {
    pub fn new<T: BatchTransport>(
        transport: T,
        options: BatchOptions,
    ) -> Result<Self, EngineError> {
        let buffer: Buffer = Arc::new(Mutex::new(Vec::new()));
        let health = Arc::new(EngineHealth::new());
        let (sender, receiver) = mpsc::channel();

        let worker = {
            let buffer = Arc::clone(&buffer);
            let health = Arc::clone(&health);
            std::thread::Builder::new()
                .name("mologger-batch".to_string())
                .spawn(move || {
                    run_worker(transport, receiver, &buffer, options.flush_interval, &health)
                })?
        };

        Ok(Self {
            buffer,
            batch_size: options.batch_size.max(1),
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
            health,
        })
    }

    /// Records waiting for the next batch
    pub fn pending(&self) -> usize {
        lock(&self.buffer).len()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
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

    fn push(&self, severity: Severity, message: &str) {
        let full = {
            let mut buffer = lock(&self.buffer);
            buffer.push(LogRecord::new(severity, message));
            if buffer.len() >= self.batch_size {
                Some(std::mem::take(&mut *buffer))
            } else {
                None
            }
        };
        if let Some(batch) = full {
            self.send(Command::Send(batch));
        }
    }
}

impl LogEngine for BatchEngine {
    fn info(&self, message: &str) {
        self.push(Severity::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Severity::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Severity::Error, message);
    }

    fn name(&self) -> &str {
        "batch"
    }

    fn flush(&self) {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.send(Command::Flush(ack_tx)) {
            let _ = ack_rx.recv();
        }
    }
}

impl Drop for BatchEngine {
    fn drop(&mut self) {
        // The worker drains the buffer once the channel closes
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

fn run_worker<T: BatchTransport>(
    mut transport: T,
    receiver: Receiver<Command>,
    buffer: &Buffer,
    flush_interval: Option<Duration>,
    health: &EngineHealth,
) {
    let mut ship = |records: Vec<LogRecord>| {
        if records.is_empty() {
            return;
        }
        let payload = BatchPayload::new(records);
        if let Err(e) = transport.send(&payload) {
            health.record("batch", &e);
        }
    };

    loop {
        let command = match flush_interval {
            Some(interval) => match receiver.recv_timeout(interval) {
                Ok(command) => command,
                Err(RecvTimeoutError::Timeout) => {
                    ship(std::mem::take(&mut *lock(buffer)));
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match receiver.recv() {
                Ok(command) => command,
                Err(_) => break,
            },
        };

        match command {
            Command::Send(batch) => ship(batch),
            Command::Flush(ack) => {
                ship(std::mem::take(&mut *lock(buffer)));
                let _ = ack.send(());
            }
        }
    }

    // Shutdown: nothing buffered may be silently dropped
    ship(std::mem::take(&mut *lock(buffer)));
}
