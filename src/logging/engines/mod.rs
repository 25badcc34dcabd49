// SPDX-License-Identifier: Apache-2.0 OR MIT
// Reference engines

mod batch;
mod console;
mod debug;
mod file;
mod memory;
mod metrics;

pub use batch::{
    BatchEngine, BatchOptions, BatchPayload, BatchTransport, TcpTransport, DEFAULT_BATCH_SIZE,
};
pub use console::{ConsoleEngine, ConsoleMode};
pub use debug::DebugEngine;
pub use file::{FileEngine, DEFAULT_MAX_BYTES};
pub use memory::{MemoryEngine, DEFAULT_MAX_ENTRIES};
pub use metrics::{MetricsEngine, MetricsSnapshot, TrackedEvent, DEFAULT_PROMOTE_KEYWORDS};

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    /// Cloneable in-memory writer for capturing engine output
    #[derive(Clone, Default)]
    pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub fn lines(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.0.lock().unwrap())
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
