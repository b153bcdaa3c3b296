use thiserror::Error;

use crate::monitoring::TargetId;

/// Errors returned to callers of [`crate::service::UptimeService`]
///
/// Probe failures never show up here; they are recorded as DOWN samples.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Target {0} not found")]
    TargetNotFound(TargetId),

    #[error("Target {0} is not a private target")]
    NotPrivate(TargetId),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("{0:#}")]
    Store(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
