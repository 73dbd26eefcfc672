//! Pipeline services
//!
//! ```text
//! emit ─▶ Formatter ─▶ OutputSink ─▶ stdout | file | suppressed
//!                          ▲   └───▶ Forwarder (mirror, optional)
//!                          │
//!                  RotationDaemon (own thread: rename, swap, prune)
//! ```

mod formatter;
mod forwarder;
mod rotation;
mod sink;

pub use formatter::{
    format_duration_ms, lookup_hostname, render_line, Formatter, ALLOWED_FIELDS,
    FIELD_SEPARATOR, TIMESTAMP_FORMAT,
};
pub use forwarder::{ForwardError, ForwardReceiver, Forwarder, SIDE_CHANNEL_CAPACITY};
pub use rotation::{
    parse_suffix, period_key, time_int, Diagnostics, RotationDaemon, RotationHandle, TickReport,
    POLL_INTERVAL,
};
pub use sink::{CaptureBuffer, OutputSink, SinkTarget};
