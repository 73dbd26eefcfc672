//! Output sink - the single active write target
//!
//! Writes and target swaps go through the same mutex, so a writer can never
//! observe a half-swapped target or write into a handle the rotation daemon
//! already closed.

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use crate::domain::{LogConfig, OutputMode};
use crate::error::{LogError, Result};

/// In-memory target, used to observe output in tests and tools.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        self.bytes.lock().clear();
    }
}

/// Where the sink currently writes.
#[derive(Debug)]
pub enum SinkTarget {
    Stdout,
    File(File),
    /// Writes are discarded.
    Suppressed,
    Capture(CaptureBuffer),
}

impl SinkTarget {
    /// Open `path` for appending, creating the file and its directory.
    pub fn open_file(path: &Path) -> Result<Self> {
        let open = || -> io::Result<File> {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            OpenOptions::new().create(true).append(true).open(path)
        };
        open().map(Self::File).map_err(|source| LogError::SinkOpen {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Target selected by the config's output mode.
    pub fn from_config(config: &LogConfig) -> Result<Self> {
        match config.output {
            OutputMode::Std => Ok(Self::Stdout),
            OutputMode::File => Self::open_file(&config.file_path()),
            OutputMode::None => Ok(Self::Suppressed),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::File(_) => "file",
            Self::Suppressed => "suppressed",
            Self::Capture(_) => "capture",
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        match self {
            Self::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(bytes)?;
                out.flush()
            }
            Self::File(file) => file.write_all(bytes),
            Self::Suppressed => Ok(()),
            Self::Capture(buf) => {
                buf.bytes.lock().extend_from_slice(bytes);
                Ok(())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout => io::stdout().flush(),
            Self::File(file) => file.flush(),
            Self::Suppressed | Self::Capture(_) => Ok(()),
        }
    }

    /// Flush and release the handle.
    pub fn close(mut self) -> io::Result<()> {
        let result = self.flush();
        drop(self);
        result
    }
}

pub struct OutputSink {
    target: Mutex<SinkTarget>,
}

impl OutputSink {
    pub fn new(target: SinkTarget) -> Self {
        Self {
            target: Mutex::new(target),
        }
    }

    /// Open the target for `config`. Failing to open a file target is an
    /// error the caller must not ignore: there is nowhere else to log.
    pub fn open(config: &LogConfig) -> Result<Self> {
        Ok(Self::new(SinkTarget::from_config(config)?))
    }

    /// Write one line, appending the newline if it is missing.
    pub fn write(&self, line: &str) -> io::Result<()> {
        let mut target = self.target.lock();
        if line.ends_with('\n') {
            target.write_all(line.as_bytes())
        } else {
            let mut buf = Vec::with_capacity(line.len() + 1);
            buf.extend_from_slice(line.as_bytes());
            buf.push(b'\n');
            target.write_all(&buf)
        }
    }

    /// Replace the active target. The previous one is flushed and closed
    /// before the lock is released.
    pub fn swap(&self, new_target: SinkTarget) -> io::Result<()> {
        let mut target = self.target.lock();
        let previous = std::mem::replace(&mut *target, new_target);
        previous.close()
    }

    /// Run `f` with exclusive access to the target; no write can interleave.
    pub fn with_target<R>(&self, f: impl FnOnce(&mut SinkTarget) -> R) -> R {
        let mut target = self.target.lock();
        f(&mut target)
    }

    pub fn flush(&self) -> io::Result<()> {
        self.target.lock().flush()
    }

    pub fn kind(&self) -> &'static str {
        self.target.lock().kind()
    }
}
