//! Caller-facing operations of the uptime engine.
//!
//! An API layer (not part of this crate) would sit on top of
//! [`UptimeService`]; the CLI uses it directly.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::database::{CheckLog, NewTarget, TargetRegistry};
use crate::error::{ServiceError, ServiceResult};
use crate::monitoring::validation::{validate_interval_minutes, validate_target_url};
use crate::monitoring::{
    AvailabilityStats, CheckExecutor, CurrentStatus, HistoryBlock, Sample, Scheduler, Status, Target,
    TargetId, history, stats,
};

/// A target together with its live status and availability
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetOverview {
    #[serde(flatten)]
    pub target: Target,
    pub current_status: CurrentStatus,
    #[serde(flatten)]
    pub stats: AvailabilityStats,
}

pub struct UptimeService {
    registry: Arc<dyn TargetRegistry>,
    log: Arc<dyn CheckLog>,
    executor: Arc<CheckExecutor>,
}

impl UptimeService {
    pub fn new(registry: Arc<dyn TargetRegistry>, log: Arc<dyn CheckLog>, executor: Arc<CheckExecutor>) -> Self {
        Self { registry, log, executor }
    }

    /// Build the scheduler loop sharing this service's registry and executor
    pub fn scheduler(&self, wake_period: Duration) -> Scheduler {
        Scheduler::new(self.registry.clone(), self.executor.clone(), wake_period)
    }

    async fn require_target(&self, id: TargetId) -> ServiceResult<Target> {
        self.registry.get_target(id).await?.ok_or(ServiceError::TargetNotFound(id))
    }

    fn validate(url: &str, interval_minutes: u32) -> ServiceResult<()> {
        validate_target_url(url).map_err(|e| ServiceError::InvalidTarget(e.to_string()))?;
        validate_interval_minutes(interval_minutes).map_err(|e| ServiceError::InvalidTarget(e.to_string()))
    }

    pub async fn add_target(&self, target: NewTarget) -> ServiceResult<Target> {
        Self::validate(&target.url, target.interval_minutes)?;
        let created = self.registry.create_target(&target).await?;
        info!(target_id = created.id, url = %created.url, "Target added");
        Ok(created)
    }

    pub async fn update_target(&self, target: &Target) -> ServiceResult<()> {
        Self::validate(&target.url, target.interval_minutes)?;
        if self.registry.update_target(target).await? {
            Ok(())
        } else {
            Err(ServiceError::TargetNotFound(target.id))
        }
    }

    pub async fn remove_target(&self, id: TargetId) -> ServiceResult<()> {
        if self.registry.delete_target(id).await? {
            info!(target_id = id, "Target removed");
            Ok(())
        } else {
            Err(ServiceError::TargetNotFound(id))
        }
    }

    pub async fn get_target(&self, id: TargetId) -> ServiceResult<Target> {
        self.require_target(id).await
    }

    /// Every target with its live status and stats
    pub async fn overview(&self) -> ServiceResult<Vec<TargetOverview>> {
        let targets = self.registry.list_active_targets().await?;
        let mut overview = Vec::with_capacity(targets.len());

        for target in targets {
            let samples = self.log.read_all(target.id).await?;
            overview.push(TargetOverview {
                current_status: current_from(&samples),
                stats: stats::aggregate(&samples),
                target,
            });
        }

        Ok(overview)
    }

    /// Up/down blocks for a target, newest first
    pub async fn get_history(&self, id: TargetId) -> ServiceResult<Vec<HistoryBlock>> {
        self.require_target(id).await?;
        let samples = self.log.read_all(id).await?;
        Ok(history::compress(&samples))
    }

    pub async fn get_stats(&self, id: TargetId) -> ServiceResult<AvailabilityStats> {
        self.require_target(id).await?;
        let samples = self.log.read_all(id).await?;
        Ok(stats::aggregate(&samples))
    }

    /// Status of the newest sample, or `Pending` before the first check lands
    pub async fn current_status(&self, id: TargetId) -> ServiceResult<CurrentStatus> {
        self.require_target(id).await?;
        let samples = self.log.read_all(id).await?;
        Ok(current_from(&samples))
    }

    /// Raw samples, newest first
    pub async fn raw_log(&self, id: TargetId) -> ServiceResult<Vec<Sample>> {
        self.require_target(id).await?;
        let mut samples = self.log.read_all(id).await?;
        samples.reverse();
        Ok(samples)
    }

    /// Probe a URL right now, ignoring any interval. Nothing is logged.
    pub async fn check_now(&self, url: &str) -> ServiceResult<Status> {
        self.executor.probe(url).await.map_err(|e| ServiceError::InvalidTarget(e.to_string()))
    }

    /// Record a status reported by a private target's own client
    pub async fn record_telemetry(&self, id: TargetId, status: Status) -> ServiceResult<()> {
        let target = self.require_target(id).await?;
        if !target.is_private {
            return Err(ServiceError::NotPrivate(id));
        }

        self.log.append(id, Utc::now(), status).await?;
        info!(target_id = id, %status, "Telemetry recorded");
        Ok(())
    }
}

fn current_from(samples: &[Sample]) -> CurrentStatus {
    samples.last().map_or(CurrentStatus::Pending, |s| s.status.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{LibsqlStore, initialize_database};
    use crate::monitoring::executor::tests::FixedChecker;
    use crate::pool::open_pool;
    use anyhow::Result;
    use chrono::TimeZone;
    use tempfile::TempDir;

    async fn create_test_service(up: bool) -> Result<(UptimeService, Arc<LibsqlStore>, TempDir)> {
        let temp_dir = tempfile::tempdir()?;
        let pool = open_pool(temp_dir.path().join("service.db"), 4).await?;
        let conn = pool.get().await?;
        initialize_database(&conn).await?;
        drop(conn);

        let store = Arc::new(LibsqlStore::new_from_pool(pool));
        let executor = Arc::new(CheckExecutor::new(Arc::new(FixedChecker::new(up)), store.clone()));
        let service = UptimeService::new(store.clone(), store.clone(), executor);
        Ok((service, store, temp_dir))
    }

    #[tokio::test]
    async fn test_add_target_validates_input() -> Result<()> {
        let (service, _store, _dir) = create_test_service(true).await?;

        assert!(matches!(
            service.add_target(NewTarget::new("ftp://example.com")).await,
            Err(ServiceError::InvalidTarget(_))
        ));
        assert!(matches!(
            service.add_target(NewTarget::new("https://example.com").with_interval(0)).await,
            Err(ServiceError::InvalidTarget(_))
        ));
        assert!(service.add_target(NewTarget::new("https://example.com")).await.is_ok());

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_target_is_not_found() -> Result<()> {
        let (service, _store, _dir) = create_test_service(true).await?;

        assert!(matches!(service.get_history(42).await, Err(ServiceError::TargetNotFound(42))));
        assert!(matches!(service.get_stats(42).await, Err(ServiceError::TargetNotFound(42))));
        assert!(matches!(service.remove_target(42).await, Err(ServiceError::TargetNotFound(42))));

        Ok(())
    }

    #[tokio::test]
    async fn test_status_is_pending_until_first_sample() -> Result<()> {
        let (service, store, _dir) = create_test_service(true).await?;
        let target = service.add_target(NewTarget::new("https://example.com")).await?;

        assert_eq!(service.current_status(target.id).await?, CurrentStatus::Pending);
        assert_eq!(service.get_stats(target.id).await?, AvailabilityStats::default());
        assert!(service.get_history(target.id).await?.is_empty());

        store.append(target.id, Utc::now(), Status::Down).await?;
        assert_eq!(service.current_status(target.id).await?, CurrentStatus::Down);

        Ok(())
    }

    #[tokio::test]
    async fn test_history_and_raw_log_ordering() -> Result<()> {
        let (service, store, _dir) = create_test_service(true).await?;
        let target = service.add_target(NewTarget::new("https://example.com")).await?;
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();

        for (minutes, status) in [(0, Status::Up), (10, Status::Up), (20, Status::Down)] {
            store.append(target.id, base + chrono::Duration::minutes(minutes), status).await?;
        }

        let history = service.get_history(target.id).await?;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status, Status::Down);
        assert_eq!(history[1].end, base + chrono::Duration::minutes(10));

        let raw = service.raw_log(target.id).await?;
        assert_eq!(raw.first().map(|s| s.status), Some(Status::Down));

        Ok(())
    }

    #[tokio::test]
    async fn test_check_now_does_not_write_log() -> Result<()> {
        let (service, store, _dir) = create_test_service(false).await?;
        let target = service.add_target(NewTarget::new("https://example.com")).await?;

        assert_eq!(service.check_now(&target.url).await?, Status::Down);
        assert!(store.read_all(target.id).await?.is_empty());
        assert!(matches!(service.check_now("nope").await, Err(ServiceError::InvalidTarget(_))));

        Ok(())
    }

    #[tokio::test]
    async fn test_telemetry_only_for_private_targets() -> Result<()> {
        let (service, _store, _dir) = create_test_service(true).await?;
        let public = service.add_target(NewTarget::new("https://example.com")).await?;
        let private = service.add_target(NewTarget::new("http://10.1.2.3").private()).await?;

        assert!(matches!(
            service.record_telemetry(public.id, Status::Up).await,
            Err(ServiceError::NotPrivate(_))
        ));

        service.record_telemetry(private.id, Status::Up).await?;
        assert_eq!(service.current_status(private.id).await?, CurrentStatus::Up);
        assert_eq!(service.get_stats(private.id).await?.distinct_up_days, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_overview_combines_status_and_stats() -> Result<()> {
        let (service, store, _dir) = create_test_service(true).await?;
        let checked = service.add_target(NewTarget::new("https://a.example")).await?;
        let fresh = service.add_target(NewTarget::new("https://b.example")).await?;
        store.append(checked.id, Utc::now(), Status::Up).await?;

        let overview = service.overview().await?;
        assert_eq!(overview.len(), 2);
        assert_eq!(overview[0].current_status, CurrentStatus::Up);
        assert_eq!(overview[0].stats.distinct_up_days, 1);
        assert_eq!(overview[1].target.id, fresh.id);
        assert_eq!(overview[1].current_status, CurrentStatus::Pending);

        Ok(())
    }
}
