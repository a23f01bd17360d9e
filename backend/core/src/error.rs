use thiserror::Error;

/// Top-level error type for Cronward.
#[derive(Debug, Error)]
pub enum CronwardError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),
}
