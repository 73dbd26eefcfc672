//! Logger configuration
//!
//! Mirrors the JSON document handed over by the host application:
//!
//! ```json
//! {
//!   "type": "file",
//!   "level": "INFO",
//!   "dir": "/var/log/app",
//!   "filename": "app.log",
//!   "rotateByDaily": true,
//!   "rotateByHour": false,
//!   "keepDays": 7
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::level::Level;
use crate::error::{LogError, Result};

/// Where records physically go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum OutputMode {
    /// Standard output. Also the fallback for unknown `type` values.
    #[default]
    Std,
    /// Append-mode file at `dir/filename`.
    File,
    /// Pipeline runs, the physical write is discarded.
    None,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Std => "std",
            Self::File => "file",
            Self::None => "none",
        }
    }
}

impl From<String> for OutputMode {
    fn from(s: String) -> Self {
        match s.as_str() {
            "file" => Self::File,
            "none" => Self::None,
            _ => Self::Std,
        }
    }
}

impl From<OutputMode> for String {
    fn from(mode: OutputMode) -> Self {
        mode.as_str().to_string()
    }
}

/// Time granularity of file rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationPolicy {
    None,
    Daily,
    Hourly,
}

impl RotationPolicy {
    /// chrono format of the period key, `None` when rotation is off.
    pub fn key_format(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Daily => Some("%Y%m%d"),
            Self::Hourly => Some("%Y%m%d%H"),
        }
    }

    /// Number of digits in a rotated file suffix.
    pub fn key_len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Daily => 8,
            Self::Hourly => 10,
        }
    }
}

/// Logger configuration. Immutable once handed to a logger.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    #[serde(rename = "type")]
    pub output: OutputMode,

    /// Threshold level name; unrecognized text emits everything.
    pub level: String,

    pub dir: PathBuf,

    pub filename: String,

    #[serde(rename = "rotateByDaily")]
    pub rotate_by_daily: bool,

    #[serde(rename = "rotateByHour")]
    pub rotate_by_hour: bool,

    /// Retention window for rotated files, in days.
    #[serde(rename = "keepDays")]
    pub keep_days: i64,
}

impl LogConfig {
    /// Stdout logger at the given threshold.
    pub fn stdout(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// File logger at `dir/filename`, no rotation.
    pub fn file(dir: impl Into<PathBuf>, filename: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            output: OutputMode::File,
            level: level.into(),
            dir: dir.into(),
            filename: filename.into(),
            ..Default::default()
        }
    }

    pub fn with_daily_rotation(mut self, keep_days: i64) -> Self {
        self.rotate_by_daily = true;
        self.rotate_by_hour = false;
        self.keep_days = keep_days;
        self
    }

    pub fn with_hourly_rotation(mut self, keep_days: i64) -> Self {
        self.rotate_by_daily = false;
        self.rotate_by_hour = true;
        self.keep_days = keep_days;
        self
    }

    /// Parse a JSON config document.
    pub fn from_json_str(text: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Read and parse a JSON config file, then validate it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LogError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text).map_err(|source| LogError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Semantic checks serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.output == OutputMode::File && self.filename.trim().is_empty() {
            return Err(LogError::InvalidConfig(
                "file output requires a filename".to_string(),
            ));
        }
        if self.keep_days < 0 {
            return Err(LogError::InvalidConfig(format!(
                "keepDays must not be negative, got {}",
                self.keep_days
            )));
        }
        Ok(())
    }

    pub fn threshold(&self) -> Level {
        Level::threshold(&self.level)
    }

    /// Daily wins when both flags are set.
    pub fn rotation(&self) -> RotationPolicy {
        if self.rotate_by_daily {
            RotationPolicy::Daily
        } else if self.rotate_by_hour {
            RotationPolicy::Hourly
        } else {
            RotationPolicy::None
        }
    }

    /// Path of the live log file.
    pub fn file_path(&self) -> PathBuf {
        self.dir.join(&self.filename)
    }

    /// Whether a rotation daemon should run for this config.
    pub fn needs_rotation_daemon(&self) -> bool {
        self.output == OutputMode::File && self.rotation() != RotationPolicy::None
    }
}
