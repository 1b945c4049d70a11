//! Utility helpers

/// Timing instrumentation helpers
pub mod timing;

pub use timing::TimedOperation;
