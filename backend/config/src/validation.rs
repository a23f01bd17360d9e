//! Config validation with field paths in every message.

use crate::schema::{CronwardConfig, StoreBackend};
use thiserror::Error;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &CronwardConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.store.backend == StoreBackend::Sqlite && config.store.sqlite_path.trim().is_empty() {
        report.error("store.sqlitePath", "SQLite backend selected but no path given");
    }
    if config.store.backend == StoreBackend::Memory {
        report.warn("store.backend", "Memory store loses misfire state on restart");
    }

    let level = config.logging.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        report.error(
            "logging.level",
            format!("Unknown log level '{}'", config.logging.level),
        );
    }

    if config.misfire.grace_secs == 0 {
        report.warn("misfire.graceSecs", "Zero grace marks every late fire as missed");
    }

    report
}
