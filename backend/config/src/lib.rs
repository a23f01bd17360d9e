//! `cronward-config` — Cronward runtime configuration.
//!
//! Provides:
//! - Typed config schema with defaults for every field
//! - YAML read/write
//! - `CRONWARD_*` environment overrides
//! - Validation with field paths

pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use env::{apply_env_overrides, apply_env_overrides_with};
pub use io::{load_config, write_config};
pub use schema::{ChainConfig, CronwardConfig, LoggingConfig, MisfireConfig, StoreBackend, StoreConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Result};
use std::path::Path;

/// Load a config file, apply environment overrides, and validate.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: &Path) -> Result<CronwardConfig> {
    let config = load_config(path).await?;
    let config = apply_env_overrides(config)?;

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.into_iter().next() {
        bail!(first);
    }

    Ok(config)
}
