//! Captures the backtrace at the point a panic is raised.
//!
//! By the time `catch_unwind` hands control back, the panicking frames are
//! gone. A panic hook runs on the panicking thread before unwinding starts,
//! so it records the trace into a thread-local slot that the catching frame
//! (same thread, same poll) reads right after.
//!
//! Every recorded trace is stamped with the run being polled when the panic
//! was raised. A run only accepts a trace carrying its own stamp, so a trace
//! left behind by a panic handled elsewhere on the thread is never
//! attributed to it.

use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::panic;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Once;
use std::task::{Context, Poll};

/// Stamp for panics raised outside any traced run.
const NO_RUN: u64 = 0;

static NEXT_RUN: AtomicU64 = AtomicU64::new(NO_RUN + 1);

thread_local! {
    static CURRENT_RUN: Cell<u64> = const { Cell::new(NO_RUN) };
    static LAST_TRACE: RefCell<Option<(u64, String)>> = const { RefCell::new(None) };
}

static INSTALL: Once = Once::new();

/// Install the capturing hook once per process, chained in front of
/// whatever hook was already set.
pub(crate) fn install() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let run = CURRENT_RUN.try_with(Cell::get).unwrap_or(NO_RUN);
            let trace = Backtrace::force_capture().to_string();
            // The slot is gone during thread teardown; nothing to record then.
            let _ = LAST_TRACE.try_with(|slot| *slot.borrow_mut() = Some((run, trace)));
            previous(info);
        }));
    });
}

/// A fresh stamp for one run.
pub(crate) fn next_run() -> u64 {
    NEXT_RUN.fetch_add(1, Ordering::Relaxed)
}

/// Take the trace recorded for `run` on this thread, if the most recent
/// panic here belongs to it. Any other trace is discarded.
pub(crate) fn take(run: u64) -> Option<String> {
    LAST_TRACE
        .try_with(|slot| slot.borrow_mut().take())
        .ok()
        .flatten()
        .and_then(|(stamp, trace)| (stamp == run).then_some(trace))
}

/// Marks `run` as current on this thread while the wrapped future is polled.
pub(crate) struct Traced<F> {
    run: u64,
    inner: F,
}

impl<F> Traced<F> {
    pub(crate) fn new(run: u64, inner: F) -> Self {
        Self { run, inner }
    }
}

impl<F: Future + Unpin> Future for Traced<F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let _scope = RunScope::enter(self.run);
        Pin::new(&mut self.inner).poll(cx)
    }
}

/// Restores the previously current run on drop, unwinding included.
struct RunScope {
    previous: u64,
}

impl RunScope {
    fn enter(run: u64) -> Self {
        let previous = CURRENT_RUN.with(|current| current.replace(run));
        Self { previous }
    }
}

impl Drop for RunScope {
    fn drop(&mut self) {
        let _ = CURRENT_RUN.try_with(|current| current.set(self.previous));
    }
}
