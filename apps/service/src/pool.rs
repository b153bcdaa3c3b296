use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use deadpool::managed::{self, Pool, RecycleError, RecycleResult};
use libsql::{Connection, Database, Error as LibsqlError};

/// How long a connection waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct LibsqlManager {
    database: Database,
}

impl LibsqlManager {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

impl managed::Manager for LibsqlManager {
    type Type = Connection;
    type Error = LibsqlError;

    async fn create(&self) -> Result<Self::Type, Self::Error> {
        let conn = self.database.connect()?;
        // Check tasks append concurrently; wait for the write lock instead of failing
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    async fn recycle(
        &self,
        conn: &mut Self::Type,
        _: &managed::Metrics,
    ) -> RecycleResult<Self::Error> {
        conn.query("SELECT 1", ())
            .await?
            .next()
            .await?
            .ok_or(RecycleError::Message("connection returned no rows".into()))?;
        Ok(())
    }
}

pub type LibsqlPool = Pool<LibsqlManager>;

/// Open (or create) a local database file and wrap it in a pool
pub async fn open_pool(path: impl AsRef<Path>, max_size: usize) -> Result<LibsqlPool> {
    let database = libsql::Builder::new_local(path.as_ref()).build().await?;
    let pool = Pool::builder(LibsqlManager::new(database)).max_size(max_size).build()?;
    Ok(pool)
}
