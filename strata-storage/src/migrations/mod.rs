//! Versioned schema migrations, applied in order on open.

mod v001_graph_schema;
mod v002_community_tables;
mod v003_chunk_fts;

use rusqlite::{params, Connection};
use tracing::info;

use strata_core::errors::{StorageError, StrataResult};

use crate::to_storage_err;

type MigrationFn = fn(&Connection) -> StrataResult<()>;

const MIGRATIONS: [(u32, &str, MigrationFn); 3] = [
    (1, "graph_schema", v001_graph_schema::migrate),
    (2, "community_tables", v002_community_tables::migrate),
    (3, "chunk_fts", v003_chunk_fts::migrate),
];

/// Highest schema version known to this build.
pub const LATEST_VERSION: u32 = 3;

/// Apply every migration newer than the recorded version. Returns the resulting version.
pub fn run_migrations(conn: &Connection) -> StrataResult<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        );",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let current = current_version(conn)?;
    for (version, name, migrate) in MIGRATIONS {
        if version <= current {
            continue;
        }
        migrate(conn).map_err(|e| StorageError::MigrationFailed {
            version,
            reason: e.to_string(),
        })?;
        conn.execute(
            "INSERT INTO schema_version (version, name, applied_at) VALUES (?1, ?2, ?3)",
            params![version, name, chrono::Utc::now().to_rfc3339()],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
        info!(version, name, "applied migration");
    }
    Ok(LATEST_VERSION.max(current))
}

/// Version recorded in `schema_version`, 0 for a fresh database.
pub fn current_version(conn: &Connection) -> StrataResult<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
