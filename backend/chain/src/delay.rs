use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use cronward_config::ChainConfig;
use cronward_core::{ExecContext, Job, Logger};

use crate::chain::{wrapper, JobWrapper};

/// Waits longer than this are reported by [`delay_if_still_running`].
pub const DELAY_LOG_THRESHOLD: Duration = Duration::from_secs(60);

/// Serialize runs of the wrapped job: a run that arrives while the previous
/// one is still going waits for it to finish. Waits over a minute are
/// logged at info level.
pub fn delay_if_still_running(logger: Arc<dyn Logger>) -> JobWrapper {
    delay_if_still_running_after(logger, DELAY_LOG_THRESHOLD)
}

/// [`delay_if_still_running`] with a custom reporting threshold.
pub fn delay_if_still_running_after(logger: Arc<dyn Logger>, threshold: Duration) -> JobWrapper {
    wrapper(move |inner| {
        Arc::new(DelayIfStillRunning {
            inner,
            logger: logger.clone(),
            threshold,
            lock: Mutex::new(()),
        })
    })
}

/// [`delay_if_still_running`] with the threshold taken from `chain.delayLogAfterSecs`.
pub fn delay_if_still_running_from(logger: Arc<dyn Logger>, config: &ChainConfig) -> JobWrapper {
    delay_if_still_running_after(logger, Duration::from_secs(config.delay_log_after_secs))
}

struct DelayIfStillRunning {
    inner: Arc<dyn Job>,
    logger: Arc<dyn Logger>,
    threshold: Duration,
    // tokio's mutex hands out the lock in FIFO order.
    lock: Mutex<()>,
}

#[async_trait]
impl Job for DelayIfStillRunning {
    async fn run(&self, ctx: ExecContext) {
        let start = Instant::now();
        let _guard = self.lock.lock().await;

        let waited = start.elapsed();
        if waited > self.threshold {
            let duration = format!("{waited:?}");
            self.logger.info(
                "delay",
                &[("duration", &duration), ("task_id", &ctx.task_id)],
            );
        }

        self.inner.run(ctx).await;
    }
}
