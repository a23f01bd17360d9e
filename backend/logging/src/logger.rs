//! Structured Logger
//!
//! Wraps `tracing` with environment-based level control and an optional
//! JSON format for the console.

use cronward_config::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl From<&LoggingConfig> for LogFormat {
    fn from(config: &LoggingConfig) -> Self {
        if config.json {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Initialize the global structured logger from the `logging` config section.
pub fn init_logger_from(config: &LoggingConfig) {
    init_logger(config.level.trim(), LogFormat::from(config));
}

/// Initialize the global structured logger.
///
/// `RUST_LOG` takes precedence over `level`. Calling this more than once is
/// harmless; only the first call installs a subscriber.
pub fn init_logger(level: &str, format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(env_filter);

    let _ = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stdout).with_ansi(false))
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stdout)
                    .with_target(false)
                    .with_ansi(true),
            )
            .try_init(),
    };
}
