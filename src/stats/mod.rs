//! Run statistics for the indicator and the recorder.
//!
//! Counters are kept per session, persisted on shutdown and accumulated
//! across runs so `status` can report lifetime totals.

pub mod log;

// Re-export commonly used types
pub use log::{
    create_shared_log, create_shared_log_with_persistence, RunLog, RunStats, SharedRunLog,
};
