//! Shared test utilities and fixtures for ctxlog integration tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use ctxlog::{CaptureBuffer, LogConfig, Logger, LoggerBuilder, ManualClock, SinkTarget};

/// Local time, panicking on DST gaps (tests only use unambiguous times).
pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

/// Builder preset with a manual clock and a fixed hostname.
pub fn builder(config: LogConfig, clock: &ManualClock) -> LoggerBuilder {
    Logger::builder(config)
        .clock(Arc::new(clock.clone()))
        .hostname(Some("test-host".to_string()))
}

/// Logger writing into memory at `level`.
pub fn capture_logger(level: &str) -> (Logger, CaptureBuffer) {
    let buf = CaptureBuffer::new();
    let clock = ManualClock::new(at(2023, 1, 10, 8, 0, 0));
    let logger = builder(LogConfig::stdout(level), &clock)
        .target(SinkTarget::Capture(buf.clone()))
        .build()
        .unwrap();
    (logger, buf)
}

/// Split a line into `(name, value)` pairs.
pub fn pairs(line: &str) -> Vec<(String, String)> {
    line.split("||")
        .map(|pair| {
            let (name, value) = pair.split_once('=').expect("pair without '='");
            (name.to_string(), value.to_string())
        })
        .collect()
}

/// Value of `name` in a rendered line.
pub fn field(line: &str, name: &str) -> Option<String> {
    pairs(line)
        .into_iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v)
}

/// Route the logger's own tracing diagnostics to the test output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
