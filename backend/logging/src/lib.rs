//! Structured logging for Cronward.
//!
//! Handles subscriber setup and the `tracing` binding of the
//! [`Logger`](cronward_core::Logger) capability.

pub mod logger;
pub mod tracing_logger;

pub use logger::{init_logger, init_logger_from, LogFormat};
pub use tracing_logger::TracingLogger;
