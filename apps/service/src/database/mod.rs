/// Storage layer
///
/// The target registry and the check log live in one libsql database,
/// exposed through the `TargetRegistry` and `CheckLog` traits so the engine
/// never depends on the storage technology.

pub mod migrations;
pub mod models;
pub mod repository;

pub use models::NewTarget;
pub use repository::{CheckLog, LibsqlStore, TargetRegistry};

use anyhow::Result;

/// Initialize database with schema
pub async fn initialize_database(conn: &libsql::Connection) -> Result<()> {
    migrations::run_migrations(conn).await
}
