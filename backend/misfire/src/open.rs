use std::sync::Arc;

use cronward_config::{StoreBackend, StoreConfig};
use cronward_core::CronwardError;
use tracing::info;

use crate::memory::MemoryMisfireStore;
use crate::sqlite::SqliteMisfireStore;
use crate::store::MisfireStore;

/// Build the store selected by `config`.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn MisfireStore>, CronwardError> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory misfire store");
            Ok(Arc::new(MemoryMisfireStore::new()))
        }
        StoreBackend::Sqlite => {
            if config.sqlite_path.trim().is_empty() {
                return Err(CronwardError::Config(
                    "store.sqlitePath must be set for the sqlite backend".to_string(),
                ));
            }
            Ok(Arc::new(SqliteMisfireStore::open(&config.sqlite_path)?))
        }
    }
}
