use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;

use cronward_core::{ExecContext, Job, Logger};

use crate::chain::{wrapper, JobWrapper};
use crate::panic_trace::{self, Traced};

/// Upper bound on the stack text attached to a panic report.
pub const STACK_LIMIT: usize = 64 << 10;

/// Contain panics raised by the wrapped job.
///
/// A panic is converted into an error plus the stack at the panic site and
/// reported through `logger` at error level. The decorated run then returns
/// normally; the job is not re-run and later fires are unaffected.
pub fn recover(logger: Arc<dyn Logger>) -> JobWrapper {
    panic_trace::install();
    wrapper(move |inner| {
        Arc::new(Recover {
            inner,
            logger: logger.clone(),
        })
    })
}

struct Recover {
    inner: Arc<dyn Job>,
    logger: Arc<dyn Logger>,
}

#[async_trait]
impl Job for Recover {
    async fn run(&self, ctx: ExecContext) {
        let task_id = ctx.task_id.clone();
        let run = panic_trace::next_run();
        let outcome = AssertUnwindSafe(Traced::new(run, self.inner.run(ctx)))
            .catch_unwind()
            .await;

        if let Err(payload) = outcome {
            let err = panic_error(payload);
            // `resume_unwind` skips the hook, so no trace is stamped for this run.
            let trace = panic_trace::take(run)
                .unwrap_or_else(|| Backtrace::force_capture().to_string());
            let stack = format!("...\n{}", truncate(&trace, STACK_LIMIT));
            self.logger
                .error(&err, "panic", &[("stack", &stack), ("task_id", &task_id)]);
        }
    }
}

/// Normalize a panic payload into an error, synthesizing one from the
/// payload's message when it is not already an error.
fn panic_error(payload: Box<dyn Any + Send>) -> anyhow::Error {
    let payload = match payload.downcast::<anyhow::Error>() {
        Ok(err) => return *err,
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<Box<dyn std::error::Error + Send + Sync>>() {
        Ok(err) => return anyhow::anyhow!(*err),
        Err(payload) => payload,
    };
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        return anyhow::anyhow!("{msg}");
    }
    if let Some(msg) = payload.downcast_ref::<String>() {
        return anyhow::anyhow!("{msg}");
    }
    anyhow::anyhow!("job panicked with a non-string payload")
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cronward_core::{job_fn, Level, RecordingLogger};
    use std::fmt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Unprintable {
        _code: u32,
    }

    #[derive(Debug)]
    struct QuotaExceeded;

    impl fmt::Display for QuotaExceeded {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("quota exceeded")
        }
    }

    impl std::error::Error for QuotaExceeded {}

    fn ctx() -> ExecContext {
        ExecContext::scheduled("backup", Utc::now())
    }

    async fn run_panicking<P>(make_payload: P) -> RecordingLogger
    where
        P: Fn() -> Box<dyn Any + Send> + Send + Sync + 'static,
    {
        let logger = RecordingLogger::new();
        let make_payload = Arc::new(make_payload);
        let job = job_fn(move |_ctx| {
            let make_payload = make_payload.clone();
            async move {
                std::panic::resume_unwind(make_payload());
            }
        });

        recover(Arc::new(logger.clone()))(job).run(ctx()).await;
        logger
    }

    fn only_error(logger: &RecordingLogger) -> cronward_core::LogRecord {
        let records = logger.records();
        assert_eq!(records.len(), 1, "exactly one log call: {records:?}");
        assert_eq!(records[0].level, Level::Error);
        assert_eq!(records[0].message, "panic");
        records[0].clone()
    }

    #[tokio::test]
    async fn str_panic_is_contained_and_logged_with_stack() {
        let logger = RecordingLogger::new();
        let job = job_fn(|_ctx| async {
            panic!("disk on fire");
        });

        recover(Arc::new(logger.clone()))(job).run(ctx()).await;

        let record = only_error(&logger);
        assert_eq!(record.error.as_deref(), Some("disk on fire"));
        let stack = record.field("stack").unwrap();
        assert!(stack.starts_with("...\n"));
        assert!(stack.len() > "...\n".len());
        assert_eq!(record.field("task_id"), Some("backup"));
    }

    #[tokio::test]
    async fn string_payload_becomes_error_message() {
        let logger = run_panicking(|| Box::new(format!("attempt {} failed", 3))).await;
        assert_eq!(only_error(&logger).error.as_deref(), Some("attempt 3 failed"));
    }

    #[tokio::test]
    async fn error_payloads_are_kept_as_errors() {
        let logger = run_panicking(|| Box::new(anyhow::anyhow!("upstream timed out"))).await;
        assert_eq!(only_error(&logger).error.as_deref(), Some("upstream timed out"));

        let logger = run_panicking(|| {
            let err: Box<dyn std::error::Error + Send + Sync> = Box::new(QuotaExceeded);
            Box::new(err)
        })
        .await;
        assert_eq!(only_error(&logger).error.as_deref(), Some("quota exceeded"));
    }

    #[tokio::test]
    async fn arbitrary_payload_is_contained() {
        let logger = run_panicking(|| Box::new(Unprintable { _code: 7 })).await;
        let record = only_error(&logger);
        assert_eq!(
            record.error.as_deref(),
            Some("job panicked with a non-string payload")
        );
        assert!(!record.field("stack").unwrap().is_empty());
    }

    #[tokio::test]
    async fn clean_run_logs_nothing_and_later_runs_still_fire() {
        let logger = RecordingLogger::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let job = {
            let calls = calls.clone();
            job_fn(move |_ctx| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        panic!("first run fails");
                    }
                }
            })
        };
        let job = recover(Arc::new(logger.clone()))(job);

        job.run(ctx()).await;
        job.run(ctx()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(logger.count(Level::Error, "panic"), 1);
    }

    #[inline(never)]
    fn handled_panic_in_unrelated_code() {
        let caught = std::panic::catch_unwind(|| panic!("handled elsewhere"));
        assert!(caught.is_err());
    }

    #[tokio::test]
    async fn rethrown_panic_does_not_reuse_a_stale_trace() {
        let logger = RecordingLogger::new();
        let job = job_fn(|_ctx| async {
            std::panic::resume_unwind(Box::new("task failed"));
        });
        let job = recover(Arc::new(logger.clone()))(job);

        // Leaves a hook-recorded trace on this thread that no job owns.
        handled_panic_in_unrelated_code();
        job.run(ctx()).await;

        let record = only_error(&logger);
        assert_eq!(record.error.as_deref(), Some("task failed"));
        let stack = record.field("stack").unwrap();
        assert!(stack.len() > "...\n".len());
        assert!(
            !stack.contains("handled_panic_in_unrelated_code"),
            "stack belongs to a panic handled elsewhere:\n{stack}"
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "ab\u{e9}cd";
        assert_eq!(truncate(s, 3), "ab");
        assert_eq!(truncate(s, 4), "ab\u{e9}");
        assert_eq!(truncate(s, 64), s);

        let long = "x".repeat(STACK_LIMIT * 2);
        assert_eq!(truncate(&long, STACK_LIMIT).len(), STACK_LIMIT);
    }
}
