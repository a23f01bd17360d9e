use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context handed to every job invocation.
///
/// `is_catch_up` is set when the run replays a missed fire rather than
/// answering a normally timed one, so job bodies can branch on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecContext {
    pub run_id: Uuid,
    pub task_id: String,
    /// The fire time this run stands for.
    pub scheduled_at: DateTime<Utc>,
    pub is_catch_up: bool,
}

impl ExecContext {
    /// Context for a run triggered at its computed fire time.
    pub fn scheduled(task_id: impl Into<String>, scheduled_at: DateTime<Utc>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            task_id: task_id.into(),
            scheduled_at,
            is_catch_up: false,
        }
    }

    /// Context for a misfire replay of `task_id`.
    pub fn catch_up(task_id: impl Into<String>, scheduled_at: DateTime<Utc>) -> Self {
        Self {
            is_catch_up: true,
            ..Self::scheduled(task_id, scheduled_at)
        }
    }
}
