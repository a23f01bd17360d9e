use std::fmt;
use std::sync::Arc;

use cronward_core::Job;

/// Decorates a job with some behavior, producing a new job.
///
/// A wrapper is called once per decorated job; any state it allocates
/// belongs to the job it returns.
pub type JobWrapper = Arc<dyn Fn(Arc<dyn Job>) -> Arc<dyn Job> + Send + Sync>;

/// Wrap a closure as a [`JobWrapper`].
pub fn wrapper<F>(f: F) -> JobWrapper
where
    F: Fn(Arc<dyn Job>) -> Arc<dyn Job> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// An ordered sequence of [`JobWrapper`]s.
///
/// `Chain::new([w1, w2, w3]).then(job)` is equivalent to `w1(w2(w3(job)))`:
/// the first wrapper is outermost, so its pre-logic runs first and its
/// post-logic runs last.
#[derive(Clone, Default)]
pub struct Chain {
    wrappers: Vec<JobWrapper>,
}

impl Chain {
    pub fn new(wrappers: impl IntoIterator<Item = JobWrapper>) -> Self {
        Self {
            wrappers: wrappers.into_iter().collect(),
        }
    }

    /// Returns a new chain with `wrapper` innermost. `self` is left untouched.
    pub fn append(&self, wrapper: JobWrapper) -> Self {
        let mut wrappers = self.wrappers.clone();
        wrappers.push(wrapper);
        Self { wrappers }
    }

    /// Decorate `job` with every wrapper in the chain.
    pub fn then(&self, job: Arc<dyn Job>) -> Arc<dyn Job> {
        self.wrappers.iter().rev().fold(job, |job, wrap| wrap(job))
    }

    pub fn len(&self) -> usize {
        self.wrappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wrappers.is_empty()
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("wrappers", &self.wrappers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use cronward_core::{job_fn, ExecContext};
    use std::sync::Mutex;

    type Trace = Arc<Mutex<Vec<String>>>;

    struct Tagged {
        inner: Arc<dyn Job>,
        tag: &'static str,
        trace: Trace,
    }

    #[async_trait]
    impl Job for Tagged {
        async fn run(&self, ctx: ExecContext) {
            self.trace.lock().unwrap().push(format!("{} pre", self.tag));
            self.inner.run(ctx).await;
            self.trace.lock().unwrap().push(format!("{} post", self.tag));
        }
    }

    fn tagged(tag: &'static str, trace: &Trace) -> JobWrapper {
        let trace = trace.clone();
        wrapper(move |inner| {
            Arc::new(Tagged {
                inner,
                tag,
                trace: trace.clone(),
            })
        })
    }

    fn body(trace: &Trace) -> Arc<dyn Job> {
        let trace = trace.clone();
        job_fn(move |_ctx| {
            let trace = trace.clone();
            async move { trace.lock().unwrap().push("job".to_string()) }
        })
    }

    #[tokio::test]
    async fn first_wrapper_is_outermost() {
        let trace: Trace = Arc::default();
        let chain = Chain::new([
            tagged("w1", &trace),
            tagged("w2", &trace),
            tagged("w3", &trace),
        ]);

        chain
            .then(body(&trace))
            .run(ExecContext::scheduled("t1", Utc::now()))
            .await;

        assert_eq!(
            *trace.lock().unwrap(),
            vec!["w1 pre", "w2 pre", "w3 pre", "job", "w3 post", "w2 post", "w1 post"]
        );
    }

    #[tokio::test]
    async fn empty_chain_is_identity() {
        let trace: Trace = Arc::default();
        let chain = Chain::default();
        assert!(chain.is_empty());

        chain
            .then(body(&trace))
            .run(ExecContext::scheduled("t1", Utc::now()))
            .await;

        assert_eq!(*trace.lock().unwrap(), vec!["job"]);
    }

    #[tokio::test]
    async fn append_leaves_base_chain_untouched() {
        let trace: Trace = Arc::default();
        let base = Chain::new([tagged("outer", &trace)]);
        let extended = base.append(tagged("inner", &trace));
        assert_eq!(base.len(), 1);
        assert_eq!(extended.len(), 2);

        extended
            .then(body(&trace))
            .run(ExecContext::scheduled("t1", Utc::now()))
            .await;

        assert_eq!(
            *trace.lock().unwrap(),
            vec!["outer pre", "inner pre", "job", "inner post", "outer post"]
        );
    }
}
