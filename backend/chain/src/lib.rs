//! `cronward-chain` — wrappers that layer run-time guarantees around a
//! scheduled [`Job`](cronward_core::Job).
//!
//! - [`recover`]: contain panics and report them with a stack trace
//! - [`delay_if_still_running`]: serialize overlapping runs
//! - [`skip_if_still_running`]: drop a run while the previous one is active
//!
//! Wrappers compose through a [`Chain`]. Every wrapper allocates its state
//! when it decorates a job, so one chain can decorate many jobs without
//! them sharing locks.

pub mod chain;
pub mod delay;
mod panic_trace;
pub mod recover;
pub mod skip;

pub use chain::{wrapper, Chain, JobWrapper};
pub use delay::{
    delay_if_still_running, delay_if_still_running_after, delay_if_still_running_from,
    DELAY_LOG_THRESHOLD,
};
pub use recover::{recover, STACK_LIMIT};
pub use skip::skip_if_still_running;
