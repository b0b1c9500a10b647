//! # Observability
//!
//! Structured logging for operator-facing events.

pub mod logger;

pub use logger::{Logger, Severity};
