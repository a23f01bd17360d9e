//! Structured logging capability consumed by job wrappers.
//!
//! Sink-agnostic: wrappers only see this trait. `cronward-logging` binds it
//! to `tracing`; tests bind it to [`RecordingLogger`].

use std::fmt;

/// A structured key/value pair attached to a log call.
pub type Field<'a> = (&'a str, &'a dyn fmt::Display);

pub trait Logger: Send + Sync {
    fn info(&self, msg: &str, fields: &[Field<'_>]);

    fn error(&self, err: &anyhow::Error, msg: &str, fields: &[Field<'_>]);
}

/// Drops every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardLogger;

impl Logger for DiscardLogger {
    fn info(&self, _msg: &str, _fields: &[Field<'_>]) {}

    fn error(&self, _err: &anyhow::Error, _msg: &str, _fields: &[Field<'_>]) {}
}

#[cfg(any(test, feature = "test-support"))]
pub use recording::{Level, LogRecord, RecordingLogger};

#[cfg(any(test, feature = "test-support"))]
mod recording {
    use std::sync::{Arc, Mutex};

    use super::{Field, Logger};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Level {
        Info,
        Error,
    }

    #[derive(Debug, Clone)]
    pub struct LogRecord {
        pub level: Level,
        pub message: String,
        pub error: Option<String>,
        pub fields: Vec<(String, String)>,
    }

    impl LogRecord {
        pub fn field(&self, key: &str) -> Option<&str> {
            self.fields
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        }
    }

    /// Captures every log call for later assertions.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingLogger {
        records: Arc<Mutex<Vec<LogRecord>>>,
    }

    impl RecordingLogger {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn records(&self) -> Vec<LogRecord> {
            self.records
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        }

        pub fn count(&self, level: Level, message: &str) -> usize {
            self.records()
                .iter()
                .filter(|r| r.level == level && r.message == message)
                .count()
        }

        fn push(&self, level: Level, message: &str, error: Option<String>, fields: &[Field<'_>]) {
            let record = LogRecord {
                level,
                message: message.to_string(),
                error,
                fields: fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            };
            self.records
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(record);
        }
    }

    impl Logger for RecordingLogger {
        fn info(&self, msg: &str, fields: &[Field<'_>]) {
            self.push(Level::Info, msg, None, fields);
        }

        fn error(&self, err: &anyhow::Error, msg: &str, fields: &[Field<'_>]) {
            self.push(Level::Error, msg, Some(err.to_string()), fields);
        }
    }
}
