//! Record formatter - enrichment and canonical line rendering

use std::time::Duration;

use crate::clock::SharedClock;
use crate::domain::{CallerLocation, Level, Record};
use crate::trace_context;

/// Field names that make it into a log line, in output order.
///
/// Anything else in a record is dropped on purpose: downstream parsers rely on
/// a fixed line shape. Adding a field means adding it here.
pub const ALLOWED_FIELDS: [&str; 10] = [
    "level",
    "file",
    "trace_id",
    "msg",
    "cost",
    "timestamp",
    "host",
    "data",
    "client_ip",
    "type",
];

/// Separator between `name=value` pairs.
pub const FIELD_SEPARATOR: &str = "||";

/// Layout of the `timestamp` field.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Render the allow-listed fields of `record` as `name=value||name=value`.
pub fn render_line(record: &Record) -> String {
    let mut line = String::with_capacity(128);
    for name in ALLOWED_FIELDS {
        if let Some(value) = record.get(name) {
            if !line.is_empty() {
                line.push_str(FIELD_SEPARATOR);
            }
            line.push_str(name);
            line.push('=');
            line.push_str(&value.to_text());
        }
    }
    line
}

/// Milliseconds with two decimals, the usual shape of a `cost` field.
pub fn format_duration_ms(d: Duration) -> String {
    format!("{:.2}", d.as_secs_f64() * 1000.0)
}

/// Best-effort hostname lookup.
pub fn lookup_hostname() -> Option<String> {
    gethostname::gethostname()
        .into_string()
        .ok()
        .filter(|h| !h.is_empty())
}

/// Stamps records with pipeline fields and renders them.
pub struct Formatter {
    clock: SharedClock,
    host: Option<String>,
}

impl Formatter {
    pub fn new(clock: SharedClock, host: Option<String>) -> Self {
        Self { clock, host }
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn timestamp(&self) -> String {
        self.clock.now().format(TIMESTAMP_FORMAT).to_string()
    }

    /// Add `level`, `trace_id`, `file` (unless the caller set one),
    /// `timestamp` and `host`.
    pub fn enrich(&self, record: &mut Record, level: Level, location: CallerLocation) {
        record.insert("level", level.as_str());
        self.enrich_context(record, location);
    }

    /// Everything [`Formatter::enrich`] adds except `level`.
    pub fn enrich_context(&self, record: &mut Record, location: CallerLocation) {
        record.insert("trace_id", trace_context::current_id());
        if !record.contains("file") {
            record.insert("file", location.render());
        }
        self.stamp(record);
    }

    /// Add `timestamp` and `host` only.
    pub fn stamp(&self, record: &mut Record) {
        record.insert("timestamp", self.timestamp());
        if let Some(host) = &self.host {
            record.insert("host", host.as_str());
        }
    }

    pub fn format(&self, mut record: Record, level: Level, location: CallerLocation) -> String {
        self.enrich(&mut record, level, location);
        render_line(&record)
    }
}
