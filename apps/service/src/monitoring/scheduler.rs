use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info};

use super::executor::CheckExecutor;
use super::types::{Target, TargetId};
use crate::database::TargetRegistry;

/// Default wake period of the control loop
pub const DEFAULT_WAKE_PERIOD: Duration = Duration::from_secs(30);

/// Monitoring scheduler - decides which targets are due and dispatches checks
///
/// The last-check map is owned by this value and only touched by the loop
/// itself. It is not persisted, so after a restart every target is due.
pub struct Scheduler {
    registry: Arc<dyn TargetRegistry>,
    executor: Arc<CheckExecutor>,
    wake_period: Duration,
    last_checks: HashMap<TargetId, Instant>,
}

impl Scheduler {
    /// Create a new scheduler
    pub fn new(registry: Arc<dyn TargetRegistry>, executor: Arc<CheckExecutor>, wake_period: Duration) -> Self {
        Self { registry, executor, wake_period, last_checks: HashMap::new() }
    }

    /// Select the public targets whose interval has elapsed at `now` and
    /// mark them as checked.
    ///
    /// A target never seen before is always due. Marking happens here, so a
    /// slow check is never dispatched twice.
    pub fn collect_due(&mut self, targets: Vec<Target>, now: Instant) -> Vec<Target> {
        let mut due = Vec::new();

        for target in targets.into_iter().filter(|t| !t.is_private) {
            let interval = Duration::from_secs(u64::from(target.interval_minutes) * 60);
            let is_due = match self.last_checks.get(&target.id) {
                Some(last) => now.saturating_duration_since(*last) >= interval,
                None => true,
            };

            if is_due {
                self.last_checks.insert(target.id, now);
                due.push(target);
            }
        }

        due
    }

    /// Drop last-check entries of targets that left the registry
    fn forget_missing(&mut self, targets: &[Target]) {
        let present: HashSet<TargetId> = targets.iter().map(|t| t.id).collect();
        self.last_checks.retain(|id, _| present.contains(id));
    }

    /// Run one wake: read the registry, then dispatch every due target.
    ///
    /// Returns the number of checks dispatched. A registry failure is
    /// logged and turns the cycle into a no-op.
    pub async fn run_cycle(&mut self) -> usize {
        let targets = match self.registry.list_active_targets().await {
            Ok(targets) => targets,
            Err(e) => {
                error!(error = %e, "Failed to read targets, skipping cycle");
                return 0;
            }
        };

        self.forget_missing(&targets);
        let due = self.collect_due(targets, Instant::now());
        let dispatched = due.len();

        for target in due {
            self.dispatch(target);
        }

        if dispatched > 0 {
            debug!(dispatched, "Dispatched checks");
        }
        dispatched
    }

    /// Spawn a detached check; its outcome is only visible through the log
    fn dispatch(&self, target: Target) {
        let executor = self.executor.clone();

        tokio::spawn(async move {
            match executor.run_check(&target).await {
                Ok(status) => {
                    info!(target_id = target.id, url = %target.url, %status, "Check completed");
                }
                Err(e) => {
                    error!(target_id = target.id, url = %target.url, error = %e, "Check could not run");
                }
            }
        });
    }

    /// Run the control loop until `shutdown` flips to `true` or its sender
    /// is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(wake_period = ?self.wake_period, "Scheduler started");

        while !*shutdown.borrow() {
            self.run_cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(self.wake_period) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Scheduler stopped");
    }
}
