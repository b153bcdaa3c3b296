use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::checker::Checker;
use super::types::{Status, Target};
use super::validation::validate_target_url;
use crate::database::CheckLog;

/// Monitoring executor - probes one target and records the outcome
pub struct CheckExecutor {
    checker: Arc<dyn Checker>,
    log: Arc<dyn CheckLog>,
}

impl CheckExecutor {
    /// Create a new executor writing to `log`
    pub fn new(checker: Arc<dyn Checker>, log: Arc<dyn CheckLog>) -> Self {
        Self { checker, log }
    }

    /// Probe a URL once.
    ///
    /// Network failures are reported as [`Status::Down`]; only a malformed
    /// URL is an error.
    pub async fn probe(&self, url: &str) -> Result<Status> {
        validate_target_url(url)?;

        match self.checker.check(url).await {
            Ok(status_code) => {
                debug!(%url, status_code, "Check succeeded");
                Ok(Status::Up)
            }
            Err(e) => {
                warn!(%url, error = %e, "Check failing");
                Ok(Status::Down)
            }
        }
    }

    /// Probe a target and append exactly one sample for it.
    ///
    /// A failed append is logged and not retried; the probed status is
    /// still returned.
    pub async fn run_check(&self, target: &Target) -> Result<Status> {
        let status = self.probe(&target.url).await?;
        let timestamp = Utc::now();

        if let Err(e) = self.log.append(target.id, timestamp, status).await {
            error!(target_id = target.id, %status, error = %e, "Failed to save check sample");
        }

        Ok(status)
    }
}
