//! Rotation & retention tests
//!
//! Drive a file logger's rotation daemon across day/hour boundaries with a
//! manual clock.
