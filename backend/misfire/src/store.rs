use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cronward_core::CronwardError;

/// Persisted next due time of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub task_id: String,
    pub next: DateTime<Utc>,
}

/// Durable bookkeeping for misfire detection and catch-up.
///
/// Two namespaces: task id → next fire time, and the set of task ids pending
/// a catch-up run. Times are kept at whole-second resolution. Every write is
/// idempotent and atomic per key; nothing is transactional across keys, and
/// coordinating concurrent writers is the scheduler's job.
///
/// Backend failures are returned as [`CronwardError::Storage`]; stores do not
/// retry on their own.
#[async_trait]
pub trait MisfireStore: Send + Sync {
    /// Last recorded next fire time. `None` means the task has no history.
    async fn get_entry(&self, task_id: &str) -> Result<Option<Entry>, CronwardError>;

    async fn put_entry(&self, task_id: &str, next: DateTime<Utc>) -> Result<(), CronwardError>;

    /// Mark `task_id` as pending catch-up.
    async fn put_retry_entry(&self, task_id: &str) -> Result<(), CronwardError>;

    /// Every task pending catch-up, in no particular order.
    async fn get_retry_entry_list(&self) -> Result<HashSet<String>, CronwardError>;

    async fn del_retry_entry(&self, task_id: &str) -> Result<(), CronwardError>;
}

pub(crate) fn from_unix(task_id: &str, secs: i64) -> Result<Entry, CronwardError> {
    let next = DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        CronwardError::Storage(format!("next fire time {secs} out of range for task {task_id}"))
    })?;
    Ok(Entry {
        task_id: task_id.to_string(),
        next,
    })
}
