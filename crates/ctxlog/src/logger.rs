//! Logger handle and the process-wide instance
//!
//! A [`Logger`] owns one pipeline: threshold, formatter, output sink, optional
//! side channels and, for rotating file output, the rotation daemon. It can be
//! used directly as a handle, or installed as the process-wide logger that the
//! `info!`/`infof!`-style macros write to.
//!
//! ```ignore
//! let config = LogConfig::from_file("conf/log.json")?;
//! ctxlog::init(config)?;
//!
//! ctxlog::info!(ctxlog::fields! { "msg" => "server started", "data" => port });
//! ctxlog::warningf!("slow query took {}ms", cost);
//! ```

use lazy_static::lazy_static;
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::clock::{system_clock, SharedClock};
use crate::domain::{should_emit, CallerLocation, Level, LogConfig, Record};
use crate::error::Result;
use crate::service::{
    lookup_hostname, Diagnostics, ForwardError, Formatter, Forwarder, OutputSink, RotationDaemon,
    RotationHandle, SinkTarget,
};

/// Shared pipeline state. The rotation daemon holds a reference to this (not
/// to the [`Logger`]) so dropping the logger stops the daemon.
struct LoggerCore {
    config: LogConfig,
    threshold: Level,
    formatter: Formatter,
    sink: Arc<OutputSink>,
    mirror: Option<Forwarder>,
    side_channel: Option<Forwarder>,
}

impl LoggerCore {
    fn emit(&self, level: Level, record: Record, location: CallerLocation) {
        // ALL only exists as a threshold
        if level == Level::All || !should_emit(level, self.threshold) {
            return;
        }
        let line = self.formatter.format(record, level, location);
        self.write(line, location);
    }

    fn write(&self, line: String, location: CallerLocation) {
        if let Err(e) = self.sink.write(&line) {
            eprintln!("ctxlog: failed to write log line: {}", e);
        }
        if let Some(mirror) = &self.mirror {
            if let Err(err) = mirror.forward(line) {
                self.report_drop(mirror, err, location);
            }
        }
    }

    /// Local diagnostic for a record a side channel refused. Goes straight to
    /// the primary sink: no threshold, no mirroring.
    fn report_drop(&self, channel: &Forwarder, err: ForwardError, location: CallerLocation) {
        self.report_unforwarded(channel.name(), err, location);
    }

    fn report_unforwarded(&self, channel: &str, err: ForwardError, location: CallerLocation) {
        let record = Record::msg(format!("{} record dropped: {}", channel, err));
        let line = self.formatter.format(record, Level::Warning, location);
        if let Err(e) = self.sink.write(&line) {
            eprintln!("ctxlog: failed to write log line: {}", e);
        }
    }
}

impl Diagnostics for LoggerCore {
    fn warning(&self, msg: String, location: CallerLocation) {
        self.emit(Level::Warning, Record::msg(msg), location);
    }
}

/// Builder for [`Logger`].
pub struct LoggerBuilder {
    config: LogConfig,
    clock: SharedClock,
    hostname: Option<Option<String>>,
    target: Option<SinkTarget>,
    mirror: Option<Forwarder>,
    side_channel: Option<Forwarder>,
    spawn_rotation: bool,
}

impl LoggerBuilder {
    fn new(config: LogConfig) -> Self {
        Self {
            config,
            clock: system_clock(),
            hostname: None,
            target: None,
            mirror: None,
            side_channel: None,
            spawn_rotation: true,
        }
    }

    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Fixed `host` value instead of looking it up; `None` omits the field.
    pub fn hostname(mut self, hostname: Option<String>) -> Self {
        self.hostname = Some(hostname);
        self
    }

    /// Write to `target` instead of the one the config selects.
    pub fn target(mut self, target: SinkTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Offer every emitted line to `forwarder` as well.
    pub fn mirror(mut self, forwarder: Forwarder) -> Self {
        self.mirror = Some(forwarder);
        self
    }

    /// Channel used by [`Logger::forward`].
    pub fn side_channel(mut self, forwarder: Forwarder) -> Self {
        self.side_channel = Some(forwarder);
        self
    }

    /// Build the rotation daemon but do not start its thread; drive it with
    /// [`Logger::rotation_daemon`] instead.
    pub fn manual_rotation(mut self) -> Self {
        self.spawn_rotation = false;
        self
    }

    /// Validate the config and open the sink. Failing to open a file target
    /// is an error: the caller must not carry on without somewhere to log.
    pub fn build(self) -> Result<Logger> {
        self.config.validate()?;

        let sink = match self.target {
            Some(target) => OutputSink::new(target),
            None => OutputSink::open(&self.config)?,
        };
        let hostname = self.hostname.unwrap_or_else(lookup_hostname);

        let core = Arc::new(LoggerCore {
            threshold: self.config.threshold(),
            formatter: Formatter::new(Arc::clone(&self.clock), hostname),
            sink: Arc::new(sink),
            mirror: self.mirror,
            side_channel: self.side_channel,
            config: self.config,
        });

        let mut rotation = None;
        let mut rotation_handle = None;
        if core.config.needs_rotation_daemon() {
            let diagnostics: Arc<dyn Diagnostics> = core.clone();
            let daemon = Arc::new(RotationDaemon::new(
                &core.config,
                Arc::clone(&core.sink),
                self.clock,
                diagnostics,
            )?);
            if self.spawn_rotation {
                rotation_handle = Some(Arc::clone(&daemon).spawn()?);
            }
            rotation = Some(daemon);
        }

        tracing::debug!(
            output = core.config.output.as_str(),
            level = %core.threshold,
            rotation = rotation.is_some(),
            "[Logger] Initialized"
        );

        Ok(Logger {
            core,
            rotation,
            _rotation_handle: rotation_handle,
        })
    }
}

pub struct Logger {
    core: Arc<LoggerCore>,
    rotation: Option<Arc<RotationDaemon>>,
    _rotation_handle: Option<RotationHandle>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

impl Logger {
    pub fn builder(config: LogConfig) -> LoggerBuilder {
        LoggerBuilder::new(config)
    }

    pub fn new(config: LogConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Stdout logger that emits everything; what the process-wide logger is
    /// before [`init`] runs.
    pub fn stdout() -> Self {
        let config = LogConfig::default();
        Self {
            core: Arc::new(LoggerCore {
                threshold: config.threshold(),
                formatter: Formatter::new(system_clock(), lookup_hostname()),
                sink: Arc::new(OutputSink::new(SinkTarget::Stdout)),
                mirror: None,
                side_channel: None,
                config,
            }),
            rotation: None,
            _rotation_handle: None,
        }
    }

    pub fn config(&self) -> &LogConfig {
        &self.core.config
    }

    pub fn threshold(&self) -> Level {
        self.core.threshold
    }

    /// The configured level text, verbatim.
    pub fn threshold_text(&self) -> &str {
        &self.core.config.level
    }

    pub fn enabled(&self, level: Level) -> bool {
        should_emit(level, self.core.threshold)
    }

    /// Rotation daemon, when the config asks for one.
    pub fn rotation_daemon(&self) -> Option<&Arc<RotationDaemon>> {
        self.rotation.as_ref()
    }

    pub fn sink(&self) -> &OutputSink {
        &self.core.sink
    }

    pub fn flush(&self) {
        let _ = self.core.sink.flush();
    }

    /// Emit `record` at `level` with an explicit location. Never exits, even
    /// at [`Level::Fatal`]; use [`Logger::fatal`] for that. [`Level::All`]
    /// is a threshold, not a record level: nothing is written for it.
    pub fn log(&self, level: Level, record: impl Into<Record>, location: CallerLocation) {
        self.core.emit(level, record.into(), location);
    }

    /// Emit a formatted message; the message is only rendered when `level`
    /// passes the threshold.
    pub fn log_fmt(&self, level: Level, args: fmt::Arguments<'_>, location: CallerLocation) {
        if self.enabled(level) {
            self.core.emit(level, Record::msg(args.to_string()), location);
        }
    }

    /// Emit at FATAL, flush, and exit the process with status 1.
    pub fn fatal_at(&self, record: impl Into<Record>, location: CallerLocation) -> ! {
        self.core.emit(Level::Fatal, record.into(), location);
        self.flush();
        std::process::exit(1)
    }

    /// The leveled methods below record `path:line` of their caller in
    /// `file`. Use the [`debug!`](crate::debug)-style macros to also get the
    /// enclosing function (`path:line::function`).
    #[track_caller]
    pub fn debug(&self, record: impl Into<Record>) {
        self.log(Level::Debug, record, CallerLocation::caller());
    }

    #[track_caller]
    pub fn info(&self, record: impl Into<Record>) {
        self.log(Level::Info, record, CallerLocation::caller());
    }

    #[track_caller]
    pub fn warning(&self, record: impl Into<Record>) {
        self.log(Level::Warning, record, CallerLocation::caller());
    }

    #[track_caller]
    pub fn error(&self, record: impl Into<Record>) {
        self.log(Level::Error, record, CallerLocation::caller());
    }

    #[track_caller]
    pub fn fatal(&self, record: impl Into<Record>) -> ! {
        self.fatal_at(record, CallerLocation::caller())
    }

    #[track_caller]
    pub fn debug_fmt(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(Level::Debug, args, CallerLocation::caller());
    }

    #[track_caller]
    pub fn info_fmt(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(Level::Info, args, CallerLocation::caller());
    }

    #[track_caller]
    pub fn warning_fmt(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(Level::Warning, args, CallerLocation::caller());
    }

    #[track_caller]
    pub fn error_fmt(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(Level::Error, args, CallerLocation::caller());
    }

    #[track_caller]
    pub fn fatal_fmt(&self, args: fmt::Arguments<'_>) -> ! {
        self.fatal_at(Record::msg(args.to_string()), CallerLocation::caller())
    }

    /// Emit a record that carries its own `level` text.
    ///
    /// The level is filtered like any other (unknown text ranks as ALL) but
    /// written exactly as given. Records without a textual `level` are
    /// written unconditionally.
    #[track_caller]
    pub fn output(&self, record: impl Into<Record>) {
        let mut record = record.into();
        let level = match record.get("level") {
            Some(crate::FieldValue::Str(text)) => Some(Level::threshold(text)),
            _ => None,
        };
        if let Some(level) = level {
            if !self.enabled(level) {
                return;
            }
        }
        let location = CallerLocation::caller();
        self.core.formatter.enrich_context(&mut record, location);
        self.core.write(crate::service::render_line(&record), location);
    }

    /// Emit `value` as JSON in `msg` at DEBUG. A value that cannot be
    /// serialized is logged as the serialization error instead.
    #[track_caller]
    pub fn debug_value<T: Serialize + ?Sized>(&self, value: &T) {
        if !self.enabled(Level::Debug) {
            return;
        }
        let msg = serde_json::to_string(value).unwrap_or_else(|e| e.to_string());
        self.log(Level::Debug, Record::msg(msg), CallerLocation::caller());
    }

    /// Stamp `timestamp` and `host` on `record` and hand its JSON encoding to
    /// the side channel. Never waits: a full or missing channel drops the
    /// record and leaves a diagnostic on the primary sink.
    #[track_caller]
    pub fn forward(&self, record: impl Into<Record>) -> std::result::Result<(), ForwardError> {
        let location = CallerLocation::caller();
        let Some(channel) = &self.core.side_channel else {
            self.core
                .report_unforwarded("side channel", ForwardError::Unattached, location);
            return Err(ForwardError::Unattached);
        };
        let mut record = record.into();
        self.core.formatter.stamp(&mut record);
        channel.forward(record.to_json()).inspect_err(|err| {
            self.core.report_drop(channel, *err, location);
        })
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        let _ = self.core.sink.flush();
    }
}

lazy_static! {
    static ref GLOBAL: RwLock<Arc<Logger>> = RwLock::new(Arc::new(Logger::stdout()));
}

/// The process-wide logger.
pub fn global() -> Arc<Logger> {
    GLOBAL.read().clone()
}

/// Replace the process-wide logger. The previous one (and its rotation
/// daemon) shuts down once the last outstanding handle to it is dropped.
pub fn set_global(logger: Logger) {
    let previous = std::mem::replace(&mut *GLOBAL.write(), Arc::new(logger));
    drop(previous);
}

/// Build a logger from `config` and install it process-wide.
pub fn init(config: LogConfig) -> Result<()> {
    set_global(Logger::new(config)?);
    Ok(())
}

/// Read a JSON config file and [`init`] from it.
pub fn init_from_file(path: impl AsRef<Path>) -> Result<()> {
    init(LogConfig::from_file(path)?)
}

/// Configured threshold text of the process-wide logger.
pub fn threshold_text() -> String {
    global().threshold_text().to_string()
}

/// [`Logger::forward`] on the process-wide logger.
#[track_caller]
pub fn forward(record: impl Into<Record>) -> std::result::Result<(), ForwardError> {
    global().forward(record)
}
