//! Tracing/logging setup shared by every binary.

/// Initialize process-wide logging in the given format.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init(format: LogFormat) {
    tracing::init(format);
}

/// Tracing configuration (filters, formatters).
pub mod tracing;

pub use crate::tracing::{LogFormat, ParseLogFormatError};
