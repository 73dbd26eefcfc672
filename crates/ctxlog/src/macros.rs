//! Logging macros
//!
//! Every level has two forms. `info!` takes a [`Record`](crate::Record) (or
//! anything convertible into one, such as a `&str` message or a
//! [`fields!`](crate::fields) map); `infof!` takes `format!`-style arguments
//! and puts the rendered text in `msg`. Both write to the process-wide logger
//! unless a logger is given first, followed by `;`:
//!
//! ```ignore
//! info!(fields! { "msg" => "user loaded", "cost" => cost });
//! infof!("user {} loaded in {}ms", id, cost);
//! warning!(logger; "pool nearly exhausted");
//! ```
//!
//! The `file` field records `path:line::function` of the macro call site.

/// Strip the marker item `__caller!` uses to name its enclosing function.
#[doc(hidden)]
pub fn __function_path(marker: &'static str) -> &'static str {
    marker.strip_suffix("::__marker").unwrap_or(marker)
}

#[doc(hidden)]
#[macro_export]
macro_rules! __caller {
    () => {{
        fn __marker() {}
        fn __name_of<T>(_: T) -> &'static str {
            ::core::any::type_name::<T>()
        }
        $crate::CallerLocation::new(
            file!(),
            line!(),
            $crate::__function_path(__name_of(__marker)),
        )
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($level:ident, $logger:expr, $record:expr) => {
        $logger.log($crate::Level::$level, $record, $crate::__caller!())
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __logf {
    ($level:ident, $logger:expr, $($arg:tt)+) => {
        $logger.log_fmt($crate::Level::$level, format_args!($($arg)+), $crate::__caller!())
    };
}

/// Build a [`Record`](crate::Record) from `name => value` pairs.
///
/// ```ignore
/// let record = fields! { "msg" => "login", "client_ip" => ip, "cost" => 1.25 };
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Record::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::Record::new();
        $( record.insert($name, $value); )+
        record
    }};
}

#[macro_export]
macro_rules! debug {
    ($logger:expr; $record:expr) => { $crate::__log!(Debug, $logger, $record) };
    ($record:expr) => { $crate::__log!(Debug, $crate::global(), $record) };
}

#[macro_export]
macro_rules! info {
    ($logger:expr; $record:expr) => { $crate::__log!(Info, $logger, $record) };
    ($record:expr) => { $crate::__log!(Info, $crate::global(), $record) };
}

#[macro_export]
macro_rules! warning {
    ($logger:expr; $record:expr) => { $crate::__log!(Warning, $logger, $record) };
    ($record:expr) => { $crate::__log!(Warning, $crate::global(), $record) };
}

#[macro_export]
macro_rules! error {
    ($logger:expr; $record:expr) => { $crate::__log!(Error, $logger, $record) };
    ($record:expr) => { $crate::__log!(Error, $crate::global(), $record) };
}

/// Log at FATAL, flush, and exit the process with status 1.
#[macro_export]
macro_rules! fatal {
    ($logger:expr; $record:expr) => {
        $logger.fatal_at($record, $crate::__caller!())
    };
    ($record:expr) => {
        $crate::global().fatal_at($record, $crate::__caller!())
    };
}

#[macro_export]
macro_rules! debugf {
    ($logger:expr; $($arg:tt)+) => { $crate::__logf!(Debug, $logger, $($arg)+) };
    ($($arg:tt)+) => { $crate::__logf!(Debug, $crate::global(), $($arg)+) };
}

#[macro_export]
macro_rules! infof {
    ($logger:expr; $($arg:tt)+) => { $crate::__logf!(Info, $logger, $($arg)+) };
    ($($arg:tt)+) => { $crate::__logf!(Info, $crate::global(), $($arg)+) };
}

#[macro_export]
macro_rules! warningf {
    ($logger:expr; $($arg:tt)+) => { $crate::__logf!(Warning, $logger, $($arg)+) };
    ($($arg:tt)+) => { $crate::__logf!(Warning, $crate::global(), $($arg)+) };
}

#[macro_export]
macro_rules! errorf {
    ($logger:expr; $($arg:tt)+) => { $crate::__logf!(Error, $logger, $($arg)+) };
    ($($arg:tt)+) => { $crate::__logf!(Error, $crate::global(), $($arg)+) };
}

/// Formatted FATAL: log, flush, exit with status 1.
#[macro_export]
macro_rules! fatalf {
    ($logger:expr; $($arg:tt)+) => {
        $logger.fatal_at($crate::Record::msg(format!($($arg)+)), $crate::__caller!())
    };
    ($($arg:tt)+) => {
        $crate::global().fatal_at($crate::Record::msg(format!($($arg)+)), $crate::__caller!())
    };
}
