//! Tests for `Logger::forward`

use std::time::{Duration, Instant};

use ctxlog::{
    fields, CaptureBuffer, ForwardError, Forwarder, LogConfig, ManualClock, SinkTarget,
    SIDE_CHANNEL_CAPACITY,
};
use tests::{at, builder, field};

#[tokio::test]
async fn consumer_task_receives_json_records() {
    let clock = ManualClock::new(at(2023, 1, 10, 8, 0, 0));
    let (side, mut rx) = Forwarder::channel("analytics");
    let logger = builder(LogConfig::stdout("INFO"), &clock)
        .target(SinkTarget::Suppressed)
        .side_channel(side)
        .build()
        .unwrap();

    let consumer = tokio::spawn(async move {
        let mut seen = Vec::new();
        while let Some(line) = rx.recv().await {
            seen.push(serde_json::from_str::<serde_json::Value>(&line).unwrap());
        }
        seen
    });

    for i in 0..3 {
        logger
            .forward(fields! { "item_id" => i, "action" => "view" })
            .unwrap();
    }
    drop(logger);

    let seen = consumer.await.unwrap();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[2]["item_id"], 2);
    assert_eq!(seen[0]["action"], "view");
    assert_eq!(seen[0]["host"], "test-host");
    assert_eq!(seen[0]["timestamp"], "2023-01-10 08:00:00.000");
}

#[test]
fn full_channel_drops_without_blocking() {
    let clock = ManualClock::new(at(2023, 1, 10, 8, 0, 0));
    let buf = CaptureBuffer::new();
    let (side, mut rx) = Forwarder::channel("analytics");
    let logger = builder(LogConfig::stdout("INFO"), &clock)
        .target(SinkTarget::Capture(buf.clone()))
        .side_channel(side.clone())
        .build()
        .unwrap();

    for i in 0..SIDE_CHANNEL_CAPACITY {
        logger.forward(fields! { "n" => i }).unwrap();
    }
    assert_eq!(side.depth(), SIDE_CHANNEL_CAPACITY);

    let started = Instant::now();
    assert_eq!(
        logger.forward(fields! { "n" => "overflow" }),
        Err(ForwardError::Full)
    );
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(side.dropped(), 1);

    let lines = buf.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(field(&lines[0], "level").as_deref(), Some("WARNING"));
    assert_eq!(
        field(&lines[0], "msg").as_deref(),
        Some("analytics record dropped: side channel full")
    );

    // the overflowing record was not queued
    let drained = rx.drain();
    assert_eq!(drained.len(), SIDE_CHANNEL_CAPACITY);
    assert!(drained.iter().all(|l| !l.contains("overflow")));
}

#[test]
fn closed_consumer_is_reported() {
    let clock = ManualClock::new(at(2023, 1, 10, 8, 0, 0));
    let buf = CaptureBuffer::new();
    let (side, rx) = Forwarder::channel("analytics");
    let logger = builder(LogConfig::stdout("INFO"), &clock)
        .target(SinkTarget::Capture(buf.clone()))
        .side_channel(side)
        .build()
        .unwrap();
    drop(rx);

    assert_eq!(
        logger.forward(fields! { "n" => 1 }),
        Err(ForwardError::Closed)
    );
    assert!(buf.contents().contains("analytics record dropped: side channel consumer is gone"));
}
