use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::params;
use tracing::warn;

use super::models::{NewTarget, TARGET_COLUMNS, sample_from_row, target_from_row, timestamp_to_i64};
use crate::monitoring::types::{Sample, Status, Target, TargetId};
use crate::pool::{LibsqlManager, LibsqlPool};

/// Durable registry of monitored targets
#[async_trait]
pub trait TargetRegistry: Send + Sync {
    /// All targets ordered by id, private ones included.
    /// Rows that cannot be decoded are skipped.
    async fn list_active_targets(&self) -> Result<Vec<Target>>;

    /// Get a target by id
    async fn get_target(&self, id: TargetId) -> Result<Option<Target>>;

    /// Store a new target and return it with its assigned id
    async fn create_target(&self, target: &NewTarget) -> Result<Target>;

    /// Overwrite the mutable attributes of a stored target.
    /// Returns `false` when no such target exists.
    async fn update_target(&self, target: &Target) -> Result<bool>;

    /// Delete a target and its samples. Returns `false` when it did not exist.
    async fn delete_target(&self, id: TargetId) -> Result<bool>;
}

/// Append-only log of status samples
#[async_trait]
pub trait CheckLog: Send + Sync {
    /// Append one sample
    async fn append(&self, target_id: TargetId, timestamp: DateTime<Utc>, status: Status) -> Result<()>;

    /// Every sample of a target, oldest first
    async fn read_all(&self, target_id: TargetId) -> Result<Vec<Sample>>;
}

/// LibSQL implementation of both the registry and the log
pub struct LibsqlStore {
    pool: LibsqlPool,
}

impl LibsqlStore {
    /// Create a new store from a pool
    pub fn new_from_pool(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    /// Get a connection from the pool
    async fn get_conn(&self) -> Result<deadpool::managed::Object<LibsqlManager>> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl TargetRegistry for LibsqlStore {
    async fn list_active_targets(&self) -> Result<Vec<Target>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(&format!("SELECT {TARGET_COLUMNS} FROM targets ORDER BY id"), ())
            .await?;

        let mut targets = Vec::new();
        while let Some(row) = rows.next().await? {
            match target_from_row(&row) {
                Ok(target) => targets.push(target),
                Err(e) => {
                    let id = row.get::<i64>(0).ok();
                    warn!(target_id = ?id, error = %e, "Skipping unreadable target row");
                }
            }
        }

        Ok(targets)
    }

    async fn get_target(&self, id: TargetId) -> Result<Option<Target>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(&format!("SELECT {TARGET_COLUMNS} FROM targets WHERE id = ?"), params![id])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(target_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn create_target(&self, target: &NewTarget) -> Result<Target> {
        let conn = self.get_conn().await?;
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO targets (url, name, usage, interval_minutes, is_private, created_at) VALUES (?, ?, ?, ?, ?, ?)",
            params![
                target.url.clone(),
                target.name.clone(),
                target.usage.clone(),
                i64::from(target.interval_minutes),
                i64::from(target.is_private),
                timestamp_to_i64(created_at)
            ],
        )
        .await?;

        let id = conn.last_insert_rowid();
        tracing::debug!(target_id = id, url = %target.url, "Stored new target");

        // Read back so the returned timestamp has the stored precision
        let mut rows = conn
            .query(&format!("SELECT {TARGET_COLUMNS} FROM targets WHERE id = ?"), params![id])
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| anyhow::anyhow!("Inserted target {} not found", id))?;
        target_from_row(&row)
    }

    async fn update_target(&self, target: &Target) -> Result<bool> {
        let conn = self.get_conn().await?;

        let changed = conn
            .execute(
                "UPDATE targets SET url = ?, name = ?, usage = ?, interval_minutes = ?, is_private = ? WHERE id = ?",
                params![
                    target.url.clone(),
                    target.name.clone(),
                    target.usage.clone(),
                    i64::from(target.interval_minutes),
                    i64::from(target.is_private),
                    target.id
                ],
            )
            .await?;

        Ok(changed > 0)
    }

    async fn delete_target(&self, id: TargetId) -> Result<bool> {
        let conn = self.get_conn().await?;

        // Foreign keys are not enforced on every connection; remove samples explicitly
        conn.execute("DELETE FROM samples WHERE target_id = ?", params![id]).await?;
        let deleted = conn.execute("DELETE FROM targets WHERE id = ?", params![id]).await?;

        Ok(deleted > 0)
    }
}

#[async_trait]
impl CheckLog for LibsqlStore {
    async fn append(&self, target_id: TargetId, timestamp: DateTime<Utc>, status: Status) -> Result<()> {
        let conn = self.get_conn().await?;

        conn.execute(
            "INSERT INTO samples (target_id, timestamp, status) VALUES (?, ?, ?)",
            params![target_id, timestamp_to_i64(timestamp), status.as_str()],
        )
        .await?;

        Ok(())
    }

    async fn read_all(&self, target_id: TargetId) -> Result<Vec<Sample>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                "SELECT target_id, timestamp, status FROM samples WHERE target_id = ? ORDER BY timestamp ASC, id ASC",
                params![target_id],
            )
            .await?;

        let mut samples = Vec::new();
        while let Some(row) = rows.next().await? {
            samples.push(sample_from_row(&row)?);
        }

        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::initialize_database;
    use crate::pool::open_pool;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    /// Helper to create a store backed by a fresh on-disk database
    async fn create_test_store() -> Result<(LibsqlStore, TempDir)> {
        let temp_dir = tempfile::tempdir()?;
        let pool = open_pool(temp_dir.path().join("test.db"), 4).await?;

        let conn = pool.get().await?;
        initialize_database(&conn).await?;
        drop(conn);

        Ok((LibsqlStore::new_from_pool(pool), temp_dir))
    }

    #[tokio::test]
    async fn test_target_crud() -> Result<()> {
        let (store, _dir) = create_test_store().await?;

        let created = store
            .create_target(&NewTarget::new("https://example.com").with_interval(5))
            .await?;
        assert_eq!(created.interval_minutes, 5);
        assert!(!created.is_private);

        let mut fetched = store.get_target(created.id).await?.expect("target exists");
        assert_eq!(fetched, created);

        fetched.name = "Example".to_string();
        fetched.is_private = true;
        assert!(store.update_target(&fetched).await?);
        assert_eq!(store.get_target(created.id).await?, Some(fetched.clone()));

        assert!(store.delete_target(created.id).await?);
        assert!(!store.delete_target(created.id).await?);
        assert_eq!(store.get_target(created.id).await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_includes_private_targets_in_id_order() -> Result<()> {
        let (store, _dir) = create_test_store().await?;

        let public = store.create_target(&NewTarget::new("https://a.example")).await?;
        let private = store.create_target(&NewTarget::new("http://10.0.0.5").private()).await?;

        let listed = store.list_active_targets().await?;
        assert_eq!(listed, vec![public, private]);

        Ok(())
    }

    #[tokio::test]
    async fn test_unreadable_row_does_not_hide_other_targets() -> Result<()> {
        let (store, _dir) = create_test_store().await?;
        let good = store.create_target(&NewTarget::new("https://a.example")).await?;

        let conn = store.get_conn().await?;
        conn.execute(
            "INSERT INTO targets (url, name, usage, interval_minutes, is_private, created_at) VALUES ('https://b.example', '', '', -5, 0, 0)",
            (),
        )
        .await?;
        drop(conn);

        assert_eq!(store.list_active_targets().await?, vec![good]);

        Ok(())
    }

    #[tokio::test]
    async fn test_read_all_is_ascending_regardless_of_append_order() -> Result<()> {
        let (store, _dir) = create_test_store().await?;
        let target = store.create_target(&NewTarget::new("https://example.com")).await?;
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();

        store.append(target.id, base + Duration::minutes(10), Status::Down).await?;
        store.append(target.id, base, Status::Up).await?;
        store.append(target.id, base + Duration::minutes(5), Status::Up).await?;

        let samples = store.read_all(target.id).await?;
        let timestamps: Vec<_> = samples.iter().map(|s| s.timestamp).collect();
        assert_eq!(timestamps, vec![base, base + Duration::minutes(5), base + Duration::minutes(10)]);
        assert_eq!(samples[2].status, Status::Down);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_target_removes_samples() -> Result<()> {
        let (store, _dir) = create_test_store().await?;
        let target = store.create_target(&NewTarget::new("https://example.com")).await?;
        store.append(target.id, Utc::now(), Status::Up).await?;

        store.delete_target(target.id).await?;
        assert!(store.read_all(target.id).await?.is_empty());

        Ok(())
    }
}
