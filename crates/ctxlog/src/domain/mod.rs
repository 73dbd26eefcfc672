//! Domain types: severity, configuration, records and caller locations

pub mod config;
mod level;
mod location;
mod record;

pub use config::{LogConfig, OutputMode, RotationPolicy};
pub use level::{should_emit, Level};
pub use location::{short_path, CallerLocation};
pub use record::{FieldValue, Record};
