//! Task-local trace context.
//!
//! Request middleware and the background sweep each open a scope so that
//! error bodies and log lines emitted deep inside services can name the
//! trace they belong to without threading an id through every call.

use tokio::task_local;

task_local! {
    static TRACE_ID: String;
}

/// Trace id of the current task, or `"unknown"` outside any scope.
pub fn trace_id() -> String {
    TRACE_ID
        .try_with(Clone::clone)
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Runs `future` with `trace_id` visible to [`trace_id`].
pub async fn with_trace_id<F, R>(trace_id: String, future: F) -> R
where
    F: std::future::Future<Output = R>,
{
    TRACE_ID.scope(trace_id, future).await
}
