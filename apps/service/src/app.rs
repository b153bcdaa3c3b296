use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::Config;
use crate::database::{LibsqlStore, initialize_database};
use crate::monitoring::{CheckExecutor, HttpChecker};
use crate::pool::open_pool;
use crate::service::UptimeService;

/// Open the database, run migrations and wire the engine together
pub async fn build_service(config: &Config) -> Result<UptimeService> {
    info!(path = %config.database.path.display(), "Opening database");
    let pool = open_pool(&config.database.path, config.database.max_connections)
        .await
        .with_context(|| format!("failed to open database {}", config.database.path.display()))?;

    {
        let conn = pool.get().await?;
        initialize_database(&conn).await?;
    }

    let store = Arc::new(LibsqlStore::new_from_pool(pool));
    let checker = Arc::new(HttpChecker::new(config.checker.timeout_seconds, &config.checker.user_agent)?);
    let executor = Arc::new(CheckExecutor::new(checker, store.clone()));

    Ok(UptimeService::new(store.clone(), store, executor))
}

/// Handle to a running scheduler loop
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Start the scheduler loop in the background
    pub fn spawn(service: &UptimeService, config: &Config) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let scheduler = service.scheduler(std::time::Duration::from_secs(config.scheduler.wake_seconds));
        let handle = tokio::spawn(scheduler.run(shutdown_rx));
        Self { shutdown_tx, handle }
    }

    /// Stop scheduling new wakes and wait for the loop to exit.
    ///
    /// Checks already in flight are left to finish within their timeout.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown_tx.send(true);
        self.handle.await.context("scheduler task panicked")
    }
}
