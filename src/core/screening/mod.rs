//! Screening run orchestration
//!
//! - [`coordinator`] - runs health check, discovery and screening in order
//! - [`scheduler`] - bounded concurrent fan-out over candidates
//! - [`summary`] - per-run results and counts

pub mod coordinator;
pub mod scheduler;
pub mod summary;

pub use coordinator::ScreeningCoordinator;
pub use scheduler::{
    DroppedUnit, RecordEvaluator, RecordSource, ScheduleOutcome, ScreeningScheduler,
};
pub use summary::ScreeningSummary;
