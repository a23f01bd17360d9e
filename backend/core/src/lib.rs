//! `cronward-core` — the capabilities every other Cronward crate builds on:
//! the [`Job`] a scheduler fires, the [`ExecContext`] each run receives, and
//! the [`Logger`] job wrappers report through.

pub mod context;
pub mod error;
pub mod job;
pub mod logger;

pub use context::ExecContext;
pub use error::CronwardError;
pub use job::{job_fn, FnJob, Job};
pub use logger::{DiscardLogger, Field, Logger};

#[cfg(any(test, feature = "test-support"))]
pub use logger::{Level, LogRecord, RecordingLogger};
