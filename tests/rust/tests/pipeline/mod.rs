//! Logging pipeline tests
//!
//! Threshold filtering, line shape, caller locations, config loading and
//! the process-wide logger.

mod config_file;
mod formatting;
