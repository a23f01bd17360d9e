use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::ExecContext;

/// A unit of scheduled work.
///
/// Jobs have no return channel: anything a wrapper observes about a run is
/// reported through a [`Logger`](crate::Logger).
#[async_trait]
pub trait Job: Send + Sync + 'static {
    async fn run(&self, ctx: ExecContext);
}

/// Adapts an async closure into a [`Job`].
pub struct FnJob<F> {
    f: F,
}

impl<F, Fut> FnJob<F>
where
    F: Fn(ExecContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Job for FnJob<F>
where
    F: Fn(ExecContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn run(&self, ctx: ExecContext) {
        (self.f)(ctx).await
    }
}

/// Shorthand for `Arc::new(FnJob::new(f))`.
pub fn job_fn<F, Fut>(f: F) -> Arc<dyn Job>
where
    F: Fn(ExecContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(FnJob::new(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[tokio::test]
    async fn fn_job_runs_closure_with_context() {
        let calls = Arc::new(AtomicUsize::new(0));
        let saw_catch_up = Arc::new(AtomicBool::new(false));

        let job = {
            let calls = calls.clone();
            let saw_catch_up = saw_catch_up.clone();
            job_fn(move |ctx| {
                let calls = calls.clone();
                let saw_catch_up = saw_catch_up.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    saw_catch_up.store(ctx.is_catch_up, Ordering::SeqCst);
                }
            })
        };

        job.run(ExecContext::catch_up("t1", Utc::now())).await;
        job.run(ExecContext::catch_up("t1", Utc::now())).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(saw_catch_up.load(Ordering::SeqCst));
    }
}
