//! Trace Context - task-scoped correlation ids
//!
//! Every logical unit of work (a Tokio task, a blocking closure, a thread
//! started through [`spawn_thread`]) can carry a [`TraceContext`]. Records
//! emitted while a context is bound carry its `trace_id`; with nothing bound
//! the process id is used instead.
//!
//! Context never crosses a spawn on its own. Work must be launched through
//! [`spawn`], [`spawn_blocking`] or [`spawn_thread`] to inherit the caller's
//! context; a bare `tokio::spawn` starts with nothing bound.
//!
//! ```ignore
//! ctxlog::trace_context::bind_and_run("req-7f3a".to_string(), async {
//!     ctxlog::info!(ctxlog::fields! { "msg" => "handling request" });
//!
//!     // child inherits req-7f3a
//!     ctxlog::trace_context::spawn(async {
//!         ctxlog::info!(ctxlog::fields! { "msg" => "background step" });
//!     });
//! })
//! .await;
//! ```

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;

tokio::task_local! {
    static TRACE_CONTEXT: TraceContext;
}

/// Values bound to the current unit of work.
///
/// Cheap to clone; a child task gets a snapshot of the parent's context at
/// spawn time and never sees later changes in the parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceContext {
    trace_id: Option<Arc<str>>,
    values: Arc<BTreeMap<String, String>>,
}

impl TraceContext {
    pub fn new(trace_id: impl Into<Arc<str>>) -> Self {
        Self {
            trace_id: Some(trace_id.into()),
            values: Arc::default(),
        }
    }

    /// Same context with a different trace id.
    pub fn with_trace_id(mut self, trace_id: impl Into<Arc<str>>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Same context with one extra value.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.values).insert(key.into(), value.into());
        self
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Snapshot of the context bound to the running unit of work.
pub fn current() -> TraceContext {
    TRACE_CONTEXT
        .try_with(TraceContext::clone)
        .unwrap_or_default()
}

/// Bound trace id, or the process id rendered as decimal text.
pub fn current_id() -> String {
    TRACE_CONTEXT
        .try_with(|ctx| ctx.trace_id().map(str::to_string))
        .ok()
        .flatten()
        .unwrap_or_else(|| std::process::id().to_string())
}

/// Run `fut` with `trace_id` bound. Other context values are inherited from
/// the enclosing scope. The previous binding is back in place once `fut`
/// completes, panics, or is dropped.
pub async fn bind_and_run<F>(trace_id: impl Into<Arc<str>>, fut: F) -> F::Output
where
    F: Future,
{
    let ctx = current().with_trace_id(trace_id);
    TRACE_CONTEXT.scope(ctx, fut).await
}

/// Synchronous counterpart of [`bind_and_run`].
pub fn bind_and_run_sync<F, R>(trace_id: impl Into<Arc<str>>, f: F) -> R
where
    F: FnOnce() -> R,
{
    let ctx = current().with_trace_id(trace_id);
    TRACE_CONTEXT.sync_scope(ctx, f)
}

/// Run `fut` with a whole context bound.
pub async fn scope<F>(ctx: TraceContext, fut: F) -> F::Output
where
    F: Future,
{
    TRACE_CONTEXT.scope(ctx, fut).await
}

/// `tokio::spawn` that carries the caller's context into the new task.
pub fn spawn<F>(fut: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let ctx = current();
    tokio::spawn(TRACE_CONTEXT.scope(ctx, fut))
}

/// `tokio::task::spawn_blocking` that carries the caller's context.
pub fn spawn_blocking<F, R>(f: F) -> JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let ctx = current();
    tokio::task::spawn_blocking(move || TRACE_CONTEXT.sync_scope(ctx, f))
}

/// `std::thread::spawn` that carries the caller's context.
pub fn spawn_thread<F, R>(f: F) -> std::thread::JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let ctx = current();
    std::thread::spawn(move || TRACE_CONTEXT.sync_scope(ctx, f))
}
