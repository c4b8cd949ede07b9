//! Table definitions. Created idempotently at open; there is no migration history.

use rusqlite::Connection;

use tessera_core::errors::{StorageError, TesseraError, TesseraResult};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS fragments (
    seq               INTEGER PRIMARY KEY AUTOINCREMENT,
    id                TEXT NOT NULL UNIQUE,
    content           TEXT NOT NULL,
    content_hash      TEXT NOT NULL,
    embedding         BLOB NOT NULL,
    dimensions        INTEGER NOT NULL,
    importance_weight REAL NOT NULL,
    keywords          TEXT NOT NULL,
    provenance        TEXT NOT NULL,
    scope             TEXT,
    created_at        TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_fragments_scope ON fragments(scope);
CREATE INDEX IF NOT EXISTS idx_fragments_hash ON fragments(content_hash);

CREATE TABLE IF NOT EXISTS fragment_values (
    fragment_id TEXT NOT NULL REFERENCES fragments(id) ON DELETE CASCADE,
    cluster_id  INTEGER NOT NULL,
    value       REAL NOT NULL,
    visits      INTEGER NOT NULL,
    updated_at  TEXT NOT NULL,
    PRIMARY KEY (fragment_id, cluster_id)
);
CREATE INDEX IF NOT EXISTS idx_values_cluster ON fragment_values(cluster_id);
";

/// Create tables and indexes if they do not exist.
pub fn ensure_schema(conn: &Connection) -> TesseraResult<()> {
    conn.execute_batch(SCHEMA).map_err(|e| {
        TesseraError::from(StorageError::SchemaFailed {
            reason: e.to_string(),
        })
    })
}
