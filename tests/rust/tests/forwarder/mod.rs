//! Side channel tests
//!
//! Bounded, never-blocking hand-off of records to a consumer task: the
//! analytics channel behind `forward` and the mirror of every emitted line.

mod analytics;
