//! Rotation & retention daemon
//!
//! # Responsibilities
//! - Detect a day/hour boundary on the wall clock
//! - Rename the live file to `<filename>.<periodKey>` and swap a fresh handle
//!   into the sink
//! - Delete rotated files older than the retention window
//!
//! # Design Decisions
//! - One dedicated thread with a fixed 1 s poll; a boundary is noticed at most
//!   one second late, which is plenty for hour/day granularity
//! - Rename, reopen and swap happen while holding the sink lock, so every line
//!   lands either in the old period's file or in the new one
//! - Failures never stop the loop; they are reported as WARNING records
//!   through the logger the daemon serves
//! - A rotated file whose suffix does not parse is kept

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Timelike};
use parking_lot::Mutex;
use regex::Regex;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, warn};

use super::sink::{OutputSink, SinkTarget};
use crate::clock::SharedClock;
use crate::domain::{CallerLocation, LogConfig, RotationPolicy};
use crate::error::{LogError, Result};

/// Interval between two daemon ticks.
pub const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);

/// Receiver of the daemon's own warnings, normally the logger core.
pub trait Diagnostics: Send + Sync {
    fn warning(&self, msg: String, location: CallerLocation);
}

/// Period key for `now`: `YYYYMMDD` (daily) or `YYYYMMDDHH` (hourly).
pub fn period_key(policy: RotationPolicy, now: DateTime<Local>) -> Option<String> {
    policy.key_format().map(|fmt| now.format(fmt).to_string())
}

/// `year·10⁶ + month·10⁴ + day·10² + hour`
pub fn time_int(t: DateTime<Local>) -> u64 {
    encode(t.year() as u64, t.month() as u64, t.day() as u64, t.hour() as u64)
}

fn encode(year: u64, month: u64, day: u64, hour: u64) -> u64 {
    year * 1_000_000 + month * 10_000 + day * 100 + hour
}

/// Parse a rotated-file suffix at the policy's granularity into its
/// [`time_int`] encoding. `None` for anything that is not a real date (and
/// hour) of exactly the expected width.
pub fn parse_suffix(suffix: &str, policy: RotationPolicy) -> Option<u64> {
    if policy == RotationPolicy::None
        || suffix.len() != policy.key_len()
        || !suffix.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let year: i32 = suffix[0..4].parse().ok()?;
    let month: u32 = suffix[4..6].parse().ok()?;
    let day: u32 = suffix[6..8].parse().ok()?;
    let hour: u32 = match policy {
        RotationPolicy::Hourly => suffix[8..10].parse().ok()?,
        _ => 0,
    };
    NaiveDate::from_ymd_opt(year, month, day)?;
    if hour > 23 {
        return None;
    }
    Some(encode(year as u64, month as u64, day as u64, hour as u64))
}

/// What one tick did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Destination of the rename, if the live file was rotated.
    pub rotated_to: Option<PathBuf>,
    pub deleted: Vec<PathBuf>,
}

pub struct RotationDaemon {
    dir: PathBuf,
    filename: String,
    policy: RotationPolicy,
    keep_days: i64,
    rotated_pattern: Regex,
    sink: Arc<OutputSink>,
    clock: SharedClock,
    diagnostics: Arc<dyn Diagnostics>,
    current_key: Mutex<String>,
}

impl RotationDaemon {
    pub fn new(
        config: &LogConfig,
        sink: Arc<OutputSink>,
        clock: SharedClock,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self> {
        let policy = config.rotation();
        let current_key = period_key(policy, clock.now()).ok_or_else(|| {
            LogError::InvalidConfig("rotation daemon needs a rotation policy".to_string())
        })?;
        let rotated_pattern = Regex::new(&format!(r"^{}\.(\d+)$", regex::escape(&config.filename)))
            .map_err(|e| LogError::InvalidConfig(format!("bad log filename pattern: {e}")))?;

        Ok(Self {
            dir: config.dir.clone(),
            filename: config.filename.clone(),
            policy,
            keep_days: config.keep_days,
            rotated_pattern,
            sink,
            clock,
            diagnostics,
            current_key: Mutex::new(current_key),
        })
    }

    pub fn current_key(&self) -> String {
        self.current_key.lock().clone()
    }

    fn live_path(&self) -> PathBuf {
        self.dir.join(&self.filename)
    }

    /// One iteration: rotate if the period changed, then sweep.
    pub fn tick(&self) -> TickReport {
        let now = self.clock.now();
        TickReport {
            rotated_to: self.rotate_if_due(now),
            deleted: self.sweep(now),
        }
    }

    fn rotate_if_due(&self, now: DateTime<Local>) -> Option<PathBuf> {
        let new_key = period_key(self.policy, now)?;
        let old_key = {
            let mut key = self.current_key.lock();
            if *key == new_key {
                return None;
            }
            std::mem::replace(&mut *key, new_key.clone())
        };

        let live = self.live_path();
        let rotated = self.dir.join(format!("{}.{}", self.filename, old_key));

        // Diagnostics are reported after the sink lock is released; they write
        // through the same sink.
        let outcome: std::result::Result<(), String> = self.sink.with_target(|target| {
            std::fs::rename(&live, &rotated)
                .map_err(|e| format!("rotateDaemon failed : {e}"))?;
            let fresh = SinkTarget::open_file(&live)
                .map_err(|e| format!("rotateDaemon reopen failed : {e}"))?;
            let previous = std::mem::replace(target, fresh);
            previous
                .close()
                .map_err(|e| format!("rotateDaemon close failed : {e}"))
        });

        match outcome {
            Ok(()) => {
                debug!(
                    from = %live.display(),
                    to = %rotated.display(),
                    period = %new_key,
                    "[Rotation] Rotated log file"
                );
                Some(rotated)
            }
            Err(msg) => {
                warn!(period = %new_key, "[Rotation] {}", msg);
                self.diagnostics.warning(msg, CallerLocation::caller());
                None
            }
        }
    }

    /// Delete rotated files whose period ended before `now - keep_days`.
    fn sweep(&self, now: DateTime<Local>) -> Vec<PathBuf> {
        // a window reaching past the representable calendar keeps everything
        let Some(cutoff) = Duration::try_days(self.keep_days)
            .and_then(|window| now.checked_sub_signed(window))
            .map(time_int)
        else {
            return Vec::new();
        };

        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "[Rotation] Cannot list log dir");
                return Vec::new();
            }
        };

        let mut deleted = Vec::new();

        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Some(caps) = self.rotated_pattern.captures(name) else {
                continue;
            };
            let Some(stamp) = parse_suffix(&caps[1], self.policy) else {
                continue;
            };
            if stamp >= cutoff {
                continue;
            }

            let path = entry.path();
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    debug!(file = %path.display(), "[Rotation] Removed expired log file");
                    deleted.push(path);
                }
                Err(e) => {
                    let msg = format!("retention delete failed file={} : {e}", path.display());
                    warn!("[Rotation] {}", msg);
                    self.diagnostics.warning(msg, CallerLocation::caller());
                }
            }
        }

        deleted
    }

    /// Start ticking on a dedicated thread.
    pub fn spawn(self: Arc<Self>) -> Result<RotationHandle> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let thread = std::thread::Builder::new()
            .name("ctxlog-rotate".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(POLL_INTERVAL) {
                    Err(RecvTimeoutError::Timeout) => {
                        self.tick();
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        debug!("[Rotation] Daemon started");
        Ok(RotationHandle {
            stop: Some(stop_tx),
            thread: Some(thread),
        })
    }
}

/// Keeps the daemon thread alive; dropping it stops the daemon.
pub struct RotationHandle {
    stop: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl RotationHandle {
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the daemon and wait for its current tick to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.thread().id() != std::thread::current().id() {
                let _ = thread.join();
            }
        }
    }
}

impl Drop for RotationHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
