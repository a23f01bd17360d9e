use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use cronward_core::CronwardError;

use crate::store::{from_unix, Entry, MisfireStore};

/// In-process [`MisfireStore`]. State is lost with the process.
#[derive(Debug, Default)]
pub struct MemoryMisfireStore {
    entries: RwLock<HashMap<String, i64>>,
    retries: RwLock<HashSet<String>>,
}

impl MemoryMisfireStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> CronwardError {
    CronwardError::Storage("memory store lock poisoned".to_string())
}

#[async_trait]
impl MisfireStore for MemoryMisfireStore {
    async fn get_entry(&self, task_id: &str) -> Result<Option<Entry>, CronwardError> {
        let entries = self.entries.read().map_err(poisoned)?;
        entries
            .get(task_id)
            .map(|secs| from_unix(task_id, *secs))
            .transpose()
    }

    async fn put_entry(&self, task_id: &str, next: DateTime<Utc>) -> Result<(), CronwardError> {
        self.entries
            .write()
            .map_err(poisoned)?
            .insert(task_id.to_string(), next.timestamp());
        Ok(())
    }

    async fn put_retry_entry(&self, task_id: &str) -> Result<(), CronwardError> {
        self.retries
            .write()
            .map_err(poisoned)?
            .insert(task_id.to_string());
        Ok(())
    }

    async fn get_retry_entry_list(&self) -> Result<HashSet<String>, CronwardError> {
        Ok(self.retries.read().map_err(poisoned)?.clone())
    }

    async fn del_retry_entry(&self, task_id: &str) -> Result<(), CronwardError> {
        self.retries.write().map_err(poisoned)?.remove(task_id);
        Ok(())
    }
}
