//! Trace context propagation tests
//!
//! Verifies that records carry the trace id bound to the unit of work that
//! emitted them, across the spawn helpers, and fall back to the process id.

mod propagation;
