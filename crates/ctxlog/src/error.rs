//! Error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced while building or initializing a logger.
///
/// Everything that can go wrong after initialization (rename, delete, write,
/// side channel overflow) is reported through the logger instead of returned.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("error opening conf file={path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing conf file={path}, err={source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid log config: {0}")]
    InvalidConfig(String),

    #[error("failed to open log file {path}: {source}")]
    SinkOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LogError>;
