//! Environment variable overrides, applied on top of the loaded file.

use crate::schema::CronwardConfig;
use anyhow::{anyhow, Context, Result};

pub const ENV_STORE_BACKEND: &str = "CRONWARD_STORE_BACKEND";
pub const ENV_SQLITE_PATH: &str = "CRONWARD_SQLITE_PATH";
pub const ENV_MISFIRE_GRACE_SECS: &str = "CRONWARD_MISFIRE_GRACE_SECS";
pub const ENV_LOG_LEVEL: &str = "CRONWARD_LOG_LEVEL";

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: CronwardConfig) -> Result<CronwardConfig> {
    apply_env_overrides_with(config, |name| std::env::var(name).ok())
}

/// Apply overrides using a custom variable lookup.
pub fn apply_env_overrides_with<F>(mut config: CronwardConfig, lookup: F) -> Result<CronwardConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(backend) = lookup(ENV_STORE_BACKEND) {
        config.store.backend = backend
            .parse()
            .map_err(|e: String| anyhow!("Invalid {ENV_STORE_BACKEND}: {e}"))?;
    }
    if let Some(path) = lookup(ENV_SQLITE_PATH) {
        config.store.sqlite_path = path;
    }
    if let Some(secs) = lookup(ENV_MISFIRE_GRACE_SECS) {
        config.misfire.grace_secs = secs
            .trim()
            .parse()
            .with_context(|| format!("Invalid {ENV_MISFIRE_GRACE_SECS}: '{secs}'"))?;
    }
    if let Some(level) = lookup(ENV_LOG_LEVEL) {
        config.logging.level = level;
    }
    Ok(config)
}
