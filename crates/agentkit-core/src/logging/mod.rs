//! Logging abstractions
//!
//! Library components log through an injected [`Logger`]; hosts that use
//! `tracing` plug in [`TracingLogger`] and call [`init_tracing`].

mod traits;
mod noop;
mod console;
mod memory;
mod tracing_bridge;

pub use traits::{LogLevel, Logger, SharedLogger};
pub use noop::NoOpLogger;
pub use console::ConsoleLogger;
pub use memory::{LogRecord, MemoryLogger};
pub use tracing_bridge::{init_tracing, level_directive, LoggingError, TracingLogger};
