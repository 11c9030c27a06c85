//! Run reporting.
//!
//! This module tracks what a batch run read, dropped and produced, for the
//! end-of-run summary and the run manifest.

pub mod log;

// Re-export commonly used types
pub use log::{create_shared_log, RunLog, RunStats, SharedRunLog};
