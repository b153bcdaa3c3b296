use anyhow::Result;
use libsql::Connection;

/// A schema step: version, description and the statements it runs
struct Migration {
    version: i32,
    description: &'static str,
    statements: &'static [&'static str],
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Targets and check samples",
        statements: &[
            "CREATE TABLE IF NOT EXISTS targets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL,
                name TEXT NOT NULL DEFAULT '',
                usage TEXT NOT NULL DEFAULT '',
                interval_minutes INTEGER NOT NULL DEFAULT 10,
                is_private INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS samples (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                target_id INTEGER NOT NULL,
                timestamp INTEGER NOT NULL,
                status TEXT NOT NULL,
                FOREIGN KEY (target_id) REFERENCES targets(id) ON DELETE CASCADE
            )",
            "CREATE INDEX IF NOT EXISTS idx_targets_private ON targets(is_private)",
            "CREATE INDEX IF NOT EXISTS idx_samples_target_timestamp ON samples(target_id, timestamp, id)",
        ],
    },
];

/// Latest schema version known to this build
pub fn schema_version() -> i32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Run database migrations
pub async fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL,
            description TEXT
        )",
        (),
    )
    .await?;

    let current_version = get_current_version(conn).await?;
    let target_version = schema_version();

    if current_version >= target_version {
        tracing::info!("Database schema is up to date (version {})", current_version);
        return Ok(());
    }

    tracing::info!("Running migrations from version {} to {}", current_version, target_version);

    for migration in MIGRATIONS.iter().filter(|m| m.version > current_version) {
        for statement in migration.statements {
            conn.execute(statement, ()).await?;
        }
        record_migration(conn, migration.version, migration.description).await?;
    }

    tracing::info!("Database migrations completed successfully (now at version {})", target_version);
    Ok(())
}

/// Get current schema version from database
async fn get_current_version(conn: &Connection) -> Result<i32> {
    let mut rows = conn.query("SELECT MAX(version) FROM schema_migrations", ()).await?;

    if let Some(row) = rows.next().await? {
        let version: Option<i32> = row.get(0)?;
        Ok(version.unwrap_or(0))
    } else {
        Ok(0)
    }
}

/// Record that a migration was applied
async fn record_migration(conn: &Connection, version: i32, description: &str) -> Result<()> {
    let now = chrono::Utc::now().timestamp();

    conn.execute(
        "INSERT INTO schema_migrations (version, applied_at, description) VALUES (?, ?, ?)",
        libsql::params![version, now, description],
    )
    .await?;

    tracing::info!("Applied migration v{}: {}", version, description);
    Ok(())
}
