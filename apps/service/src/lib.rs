//! Uptrack - uptime monitoring engine.
//!
//! Targets live in a registry, each with its own polling interval. The
//! [`monitoring::Scheduler`] wakes on a fixed period, dispatches due checks as
//! detached tasks and every check appends one sample to the check log. The
//! log is compressed on read into up/down history blocks and availability
//! stats by [`service::UptimeService`].

pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod monitoring;
pub mod pool;
pub mod service;

pub use error::{ServiceError, ServiceResult};
pub use service::{TargetOverview, UptimeService};
