//! Typed configuration schema. Every field has a default so an empty or
//! missing file yields a working configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SQLITE_PATH: &str = "cronward.db";
pub const DEFAULT_GRACE_SECS: u64 = 30;
pub const DEFAULT_DELAY_LOG_AFTER_SECS: u64 = 60;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CronwardConfig {
    pub store: StoreConfig,
    pub misfire: MisfireConfig,
    pub chain: ChainConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Sqlite,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!("unknown store backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub sqlite_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            sqlite_path: DEFAULT_SQLITE_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MisfireConfig {
    /// How late a fire may be before it counts as missed.
    pub grace_secs: u64,
}

impl Default for MisfireConfig {
    fn default() -> Self {
        Self {
            grace_secs: DEFAULT_GRACE_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChainConfig {
    /// Waits behind a still-running job longer than this are logged.
    pub delay_log_after_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            delay_log_after_secs: DEFAULT_DELAY_LOG_AFTER_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: CronwardConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, CronwardConfig::default());
        assert_eq!(config.misfire.grace_secs, 30);
        assert_eq!(config.chain.delay_log_after_secs, 60);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let yaml = "store:\n  backend: sqlite\n  sqlitePath: /var/lib/cronward/misfire.db\n";
        let config: CronwardConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.store.sqlite_path, "/var/lib/cronward/misfire.db");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("SQLite".parse::<StoreBackend>(), Ok(StoreBackend::Sqlite));
        assert!("redis".parse::<StoreBackend>().is_err());
    }
}
