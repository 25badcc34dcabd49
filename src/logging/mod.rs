// Multi-engine logging: tags, engine contract, registry and dispatcher
//
// Application code logs through a `LoggingContext`. Every call takes a
// snapshot of the `EngineRegistry` and fans the rendered message out to
// each registered `LogEngine` in registration order.

mod engine;
pub mod engines;
mod entry;
mod logger;
#[macro_use]
mod macros;
mod registry;
mod severity;
mod tag;
mod tagged;

// Public exports
pub use engine::{EngineError, EngineHealth, LogEngine};
pub use engines::{
    BatchEngine, BatchOptions, BatchPayload, BatchTransport, ConsoleEngine, ConsoleMode,
    DebugEngine, FileEngine, MemoryEngine, MetricsEngine, TcpTransport,
};
pub use entry::LogRecord;
pub use logger::LoggingContext;
pub use registry::{DefaultEngineFactory, EngineId, EngineRegistry};
pub use severity::{ParseSeverityError, Severity};
pub use tag::{Tag, TagGroup};
pub use tagged::{TaggedLogger, TaggedLogging};
