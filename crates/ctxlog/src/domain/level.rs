//! Severity levels and threshold filtering

use serde::{Deserialize, Serialize};
use std::fmt;

/// Record severity, most severe first.
///
/// The numeric rank doubles as the ordering: a record is emitted when its rank
/// is less than or equal to the configured threshold's rank. `All` is only a
/// threshold ceiling and is never attached to a record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Fatal = 0,
    Error = 1,
    Warning = 2,
    Info = 3,
    Debug = 4,
    All = 5,
}

impl Level {
    /// Levels a caller can emit at, most severe first.
    pub const EMITTABLE: [Level; 5] = [
        Level::Fatal,
        Level::Error,
        Level::Warning,
        Level::Info,
        Level::Debug,
    ];

    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fatal => "FATAL",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::All => "ALL",
        }
    }

    /// Strict lookup; `None` for anything that is not one of the five
    /// emittable level names.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FATAL" => Some(Self::Fatal),
            "ERROR" => Some(Self::Error),
            "WARNING" => Some(Self::Warning),
            "INFO" => Some(Self::Info),
            "DEBUG" => Some(Self::Debug),
            _ => None,
        }
    }

    /// Resolve configured threshold text.
    ///
    /// Unrecognized text (including the empty string) resolves to `All`, so a
    /// typo in the configured level emits everything instead of failing.
    pub fn threshold(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::All)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True iff a record at `level` passes `threshold`.
pub fn should_emit(level: Level, threshold: Level) -> bool {
    level.rank() <= threshold.rank()
}
