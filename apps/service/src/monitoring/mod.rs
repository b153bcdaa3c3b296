/// Monitoring engine module
///
/// This module is responsible for:
/// - Probing target URLs and recording samples
/// - Scheduling checks per target interval
/// - Compressing sample logs into history blocks and availability stats
pub mod checker;
pub mod executor;
pub mod history;
pub mod scheduler;
pub mod stats;
pub mod types;
pub mod validation;

pub use checker::{Checker, HttpChecker};
pub use executor::CheckExecutor;
pub use scheduler::Scheduler;
pub use types::{AvailabilityStats, CurrentStatus, HistoryBlock, Sample, Status, Target, TargetId};
