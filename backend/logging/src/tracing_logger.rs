//! Binds the [`Logger`] capability job wrappers use to `tracing`.

use cronward_core::{Field, Logger};
use tracing::{error, info};

/// Emits wrapper reports as `tracing` events under the `cronward` target.
///
/// The keys wrappers report (`task_id`, `duration`, `stack`) become fields of
/// their own; anything else is rendered into a single `extra` value as
/// `key=value` separated by spaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, msg: &str, fields: &[Field<'_>]) {
        let f = Known::split(fields);
        let extra = f.rest();
        info!(
            target: "cronward",
            task_id = f.task_id.as_deref(),
            duration = f.duration.as_deref(),
            stack = f.stack.as_deref(),
            extra = extra.as_deref(),
            "{msg}"
        );
    }

    fn error(&self, err: &anyhow::Error, msg: &str, fields: &[Field<'_>]) {
        let f = Known::split(fields);
        let extra = f.rest();
        error!(
            target: "cronward",
            error = %format!("{err:#}"),
            task_id = f.task_id.as_deref(),
            duration = f.duration.as_deref(),
            stack = f.stack.as_deref(),
            extra = extra.as_deref(),
            "{msg}"
        );
    }
}

#[derive(Debug, Default)]
struct Known {
    task_id: Option<String>,
    duration: Option<String>,
    stack: Option<String>,
    rest: Vec<String>,
}

impl Known {
    fn split(fields: &[Field<'_>]) -> Self {
        let mut known = Self::default();
        for (key, value) in fields {
            let value = value.to_string();
            match *key {
                "task_id" => known.task_id = Some(value),
                "duration" => known.duration = Some(value),
                "stack" => known.stack = Some(value),
                other => known.rest.push(format!("{other}={value}")),
            }
        }
        known
    }

    /// Unknown pairs, or `None` when there are none.
    fn rest(&self) -> Option<String> {
        (!self.rest.is_empty()).then(|| self.rest.join(" "))
    }
}
