//! Caller location captured at the public entry point

use std::panic::Location;

/// Source location of the code that emitted a record.
///
/// The logging macros fill in the enclosing function path; the
/// `#[track_caller]` methods on [`crate::Logger`] only know file and line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerLocation {
    file: &'static str,
    line: u32,
    function: Option<&'static str>,
}

impl CallerLocation {
    pub const fn new(file: &'static str, line: u32, function: &'static str) -> Self {
        Self {
            file,
            line,
            function: Some(function),
        }
    }

    /// Location of whoever called the `#[track_caller]` function this is
    /// invoked from.
    #[track_caller]
    pub fn caller() -> Self {
        let loc = Location::caller();
        Self {
            file: loc.file(),
            line: loc.line(),
            function: None,
        }
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn function(&self) -> Option<&'static str> {
        self.function
    }

    /// `path:line::function`, path cut to its last three segments.
    pub fn render(&self) -> String {
        let path = short_path(self.file, 3);
        match self.function {
            Some(function) => format!("{}:{}::{}", path, self.line, function),
            None => format!("{}:{}", path, self.line),
        }
    }
}

/// Keep at most the last `n` segments of a path, joined with `/`.
///
/// Both `/` and `\` count as separators so Windows `file!()` paths shorten
/// the same way.
pub fn short_path(path: &str, n: usize) -> String {
    let segments: Vec<&str> = path.split(['/', '\\']).collect();
    let start = segments.len().saturating_sub(n);
    segments[start..].join("/")
}
