//! # ctxlog
//!
//! Process-wide structured logger for services that follow a request across
//! tasks and threads.
//!
//! ## Modules
//!
//! - `domain` - Levels, configuration, records and caller locations
//! - `trace_context` - Task-scoped trace id and the spawn helpers that carry it
//! - `service` - Formatter, output sink, rotation daemon and side channel
//! - `logger` - Logger handle and the process-wide instance
//! - `clock` - Wall clock abstraction (real or manually driven)
//!
//! Lines look like:
//!
//! ```text
//! level=INFO||file=src/api/user.rs:42::app::api::user::load||trace_id=7f3a||msg=loaded||cost=1.52||timestamp=2023-01-10 08:30:05.007||host=web-01
//! ```

pub mod clock;
pub mod domain;
pub mod error;
pub mod logger;
mod macros;
pub mod service;
pub mod trace_context;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use domain::{
    should_emit, short_path, CallerLocation, FieldValue, Level, LogConfig, OutputMode, Record,
    RotationPolicy,
};
pub use error::{LogError, Result};
pub use logger::{
    forward, global, init, init_from_file, set_global, threshold_text, Logger, LoggerBuilder,
};
pub use service::{
    format_duration_ms, CaptureBuffer, ForwardError, ForwardReceiver, Forwarder, SinkTarget,
    SIDE_CHANNEL_CAPACITY,
};

#[doc(hidden)]
pub use macros::__function_path;
