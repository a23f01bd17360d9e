//! Scheduler-side bookkeeping on top of a [`MisfireStore`].
//!
//! Per task: Scheduled → Running → Completed | Failed. Completing writes the
//! next fire time and clears any retry marker; failing, or detecting a
//! missed window, sets one. A successful catch-up clears it again.
//!
//! Writes are at-least-once: a crash between a run and [`MisfireLedger::complete`]
//! leaves the old entry in place, so the run may be caught up again on restart.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use cronward_config::MisfireConfig;
use cronward_core::{CronwardError, ExecContext, Job};

use crate::store::MisfireStore;

/// How late a fire may be before it counts as missed.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(30);

/// Outcome of comparing a task's recorded next fire time against now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MisfireCheck {
    /// No entry recorded; the task has never completed a run.
    NeverRun,
    /// The recorded fire time is in the future or within the grace period.
    OnTime { next: DateTime<Utc> },
    /// The recorded fire time elapsed without a run. A retry marker has
    /// been written.
    Missed { due: DateTime<Utc> },
}

pub struct MisfireLedger {
    store: Arc<dyn MisfireStore>,
    grace: Duration,
}

impl MisfireLedger {
    pub fn new(store: Arc<dyn MisfireStore>, grace: Duration) -> Self {
        Self { store, grace }
    }

    /// Ledger whose grace period comes from `misfire.graceSecs`.
    pub fn from_config(store: Arc<dyn MisfireStore>, config: &MisfireConfig) -> Self {
        Self::new(store, Duration::from_secs(config.grace_secs))
    }

    pub fn store(&self) -> &Arc<dyn MisfireStore> {
        &self.store
    }

    /// Detect whether `task_id` missed its window as of `now`.
    pub async fn check(
        &self,
        task_id: &str,
        now: DateTime<Utc>,
    ) -> Result<MisfireCheck, CronwardError> {
        let Some(entry) = self.store.get_entry(task_id).await? else {
            return Ok(MisfireCheck::NeverRun);
        };

        // Negative lateness (entry still in the future) fails `to_std`.
        let late = now
            .signed_duration_since(entry.next)
            .to_std()
            .unwrap_or(Duration::ZERO);
        if late <= self.grace {
            return Ok(MisfireCheck::OnTime { next: entry.next });
        }

        self.store.put_retry_entry(task_id).await?;
        info!(
            task_id,
            due = %entry.next,
            late_secs = late.as_secs(),
            "Misfire detected, marked for catch-up"
        );
        Ok(MisfireCheck::Missed { due: entry.next })
    }

    /// Record a completed (or recovered) run and its next fire time.
    ///
    /// `next` never moves backwards: an older time than the one on record is
    /// ignored.
    pub async fn complete(&self, task_id: &str, next: DateTime<Utc>) -> Result<(), CronwardError> {
        if let Some(entry) = self.store.get_entry(task_id).await? {
            if next.timestamp() < entry.next.timestamp() {
                warn!(
                    task_id,
                    recorded = %entry.next,
                    proposed = %next,
                    "Ignoring next fire time earlier than the recorded one"
                );
                return self.store.del_retry_entry(task_id).await;
            }
        }
        self.store.put_entry(task_id, next).await?;
        self.store.del_retry_entry(task_id).await?;
        debug!(task_id, next = %next, "Run accounted for");
        Ok(())
    }

    /// Mark `task_id` as pending catch-up after a run failed or could not
    /// proceed.
    pub async fn fail(&self, task_id: &str) -> Result<(), CronwardError> {
        self.store.put_retry_entry(task_id).await?;
        info!(task_id, "Run did not complete, marked for catch-up");
        Ok(())
    }

    /// Tasks pending catch-up, sorted by id.
    pub async fn pending(&self) -> Result<Vec<String>, CronwardError> {
        let mut ids: Vec<String> = self.store.get_retry_entry_list().await?.into_iter().collect();
        ids.sort();
        Ok(ids)
    }

    /// Run `job` as a catch-up for the fire due at `due`, then clear the
    /// task's retry marker.
    ///
    /// Jobs have no return channel, so the marker is cleared whenever the
    /// run returns. Wrap the job in `recover` to keep a panic from escaping
    /// here; a job that needs to stay pending must call [`Self::fail`] itself.
    pub async fn replay(
        &self,
        task_id: &str,
        job: &dyn Job,
        due: DateTime<Utc>,
    ) -> Result<(), CronwardError> {
        info!(task_id, due = %due, "Replaying missed run");
        job.run(ExecContext::catch_up(task_id, due)).await;
        self.store.del_retry_entry(task_id).await
    }
}
