use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use cronward_core::{ExecContext, Job, Logger};

use crate::chain::{wrapper, JobWrapper};

/// Skip a run of the wrapped job if the previous run is still going.
/// Skips are logged at info level; the caller is never blocked.
pub fn skip_if_still_running(logger: Arc<dyn Logger>) -> JobWrapper {
    wrapper(move |inner| {
        Arc::new(SkipIfStillRunning {
            inner,
            logger: logger.clone(),
            permit: Semaphore::new(1),
        })
    })
}

struct SkipIfStillRunning {
    inner: Arc<dyn Job>,
    logger: Arc<dyn Logger>,
    permit: Semaphore,
}

#[async_trait]
impl Job for SkipIfStillRunning {
    async fn run(&self, ctx: ExecContext) {
        match self.permit.try_acquire() {
            // The permit returns to the semaphore when dropped, unwinding included.
            Ok(_permit) => self.inner.run(ctx).await,
            Err(_) => self.logger.info("skip", &[("task_id", &ctx.task_id)]),
        }
    }
}
