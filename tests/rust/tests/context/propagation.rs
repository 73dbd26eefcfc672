//! Tests for trace id propagation through the logger

use std::sync::Arc;

use ctxlog::trace_context::{self, TraceContext};
use tests::{capture_logger, field};

fn trace_ids(lines: &[String]) -> Vec<String> {
    let mut ids: Vec<String> = lines
        .iter()
        .map(|l| field(l, "trace_id").unwrap())
        .collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn unbound_work_uses_process_id() {
    let (logger, buf) = capture_logger("INFO");
    logger.info("no context");
    assert_eq!(
        field(&buf.lines()[0], "trace_id"),
        Some(std::process::id().to_string())
    );
}

#[tokio::test]
async fn bound_id_reaches_spawned_children() {
    let (logger, buf) = capture_logger("INFO");
    let logger = Arc::new(logger);

    let l = logger.clone();
    trace_context::bind_and_run("abc", async move {
        l.info("parent");

        let child = l.clone();
        trace_context::spawn(async move {
            child.info("async child");
        })
        .await
        .unwrap();

        let blocking = l.clone();
        trace_context::spawn_blocking(move || blocking.info("blocking child"))
            .await
            .unwrap();

        let thread = l.clone();
        trace_context::spawn_thread(move || thread.info("thread child"))
            .join()
            .unwrap();
    })
    .await;

    assert_eq!(trace_ids(&buf.lines()), vec!["abc"; 4]);
}

#[tokio::test]
async fn plain_spawn_does_not_inherit() {
    let (logger, buf) = capture_logger("INFO");
    let logger = Arc::new(logger);

    let l = logger.clone();
    trace_context::bind_and_run("req-1", async move {
        let orphan = l.clone();
        tokio::spawn(async move { orphan.info("plain spawn") })
            .await
            .unwrap();
    })
    .await;

    assert_eq!(
        field(&buf.lines()[0], "trace_id"),
        Some(std::process::id().to_string())
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_stay_isolated() {
    let (logger, buf) = capture_logger("INFO");
    let logger = Arc::new(logger);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let l = logger.clone();
            tokio::spawn(trace_context::bind_and_run(format!("req-{i:02}"), async move {
                for step in 0..5 {
                    tokio::task::yield_now().await;
                    ctxlog::infof!(&l; "step {}", step);
                }
            }))
        })
        .collect();
    for result in futures::future::join_all(handles).await {
        result.unwrap();
    }

    let lines = buf.lines();
    assert_eq!(lines.len(), 16 * 5);
    for i in 0..16 {
        let id = format!("req-{i:02}");
        let count = lines
            .iter()
            .filter(|l| field(l, "trace_id").as_deref() == Some(id.as_str()))
            .count();
        assert_eq!(count, 5, "{}", id);
    }
}

#[tokio::test]
async fn nested_binding_restores_outer_id() {
    let (logger, buf) = capture_logger("INFO");
    let logger = Arc::new(logger);

    let l = logger.clone();
    trace_context::scope(TraceContext::new("outer"), async move {
        let inner = l.clone();
        trace_context::bind_and_run("inner", async move { inner.info("in") }).await;
        l.info("out");
    })
    .await;

    let lines = buf.lines();
    assert_eq!(field(&lines[0], "trace_id").as_deref(), Some("inner"));
    assert_eq!(field(&lines[1], "trace_id").as_deref(), Some("outer"));
}
