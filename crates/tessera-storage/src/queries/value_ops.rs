//! (fragment, cluster) value entries.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use tessera_core::errors::TesseraResult;
use tessera_core::fragment::{ClusterId, ValueEntry};

use crate::to_storage_err;

pub fn get_entry(
    conn: &Connection,
    fragment_id: &str,
    cluster: ClusterId,
) -> TesseraResult<Option<ValueEntry>> {
    conn.query_row(
        "SELECT value, visits FROM fragment_values WHERE fragment_id = ?1 AND cluster_id = ?2",
        params![fragment_id, cluster],
        |row| {
            Ok(ValueEntry {
                value: row.get(0)?,
                visits: row.get::<_, i64>(1)? as u64,
            })
        },
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

fn upsert_entry(
    conn: &Connection,
    fragment_id: &str,
    cluster: ClusterId,
    entry: ValueEntry,
) -> TesseraResult<()> {
    conn.execute(
        "INSERT INTO fragment_values (fragment_id, cluster_id, value, visits, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(fragment_id, cluster_id) DO UPDATE SET
            value = excluded.value,
            visits = excluded.visits,
            updated_at = excluded.updated_at",
        params![
            fragment_id,
            cluster,
            entry.value,
            entry.visits as i64,
            Utc::now().to_rfc3339()
        ],
    )
    .map_err(|e| to_storage_err(format!("upsert value {fragment_id}/{cluster}: {e}")))?;
    Ok(())
}

/// Read-modify-write of one entry inside a savepoint. Must run on the
/// single write connection so concurrent updates are serialized.
pub fn apply_reward(
    conn: &Connection,
    fragment_id: &str,
    cluster: ClusterId,
    reward: f64,
    learning_rate: f64,
) -> TesseraResult<ValueEntry> {
    conn.execute_batch("SAVEPOINT apply_reward")
        .map_err(|e| to_storage_err(format!("apply_reward savepoint: {e}")))?;

    let result = get_entry(conn, fragment_id, cluster).and_then(|current| {
        let next = current
            .unwrap_or_else(ValueEntry::optimistic_default)
            .updated(reward, learning_rate);
        upsert_entry(conn, fragment_id, cluster, next)?;
        Ok(next)
    });

    match result {
        Ok(entry) => {
            conn.execute_batch("RELEASE apply_reward")
                .map_err(|e| to_storage_err(format!("apply_reward release: {e}")))?;
            Ok(entry)
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK TO apply_reward");
            let _ = conn.execute_batch("RELEASE apply_reward");
            Err(e)
        }
    }
}

pub fn seed_entry(
    conn: &Connection,
    fragment_id: &str,
    cluster: ClusterId,
    value: f64,
) -> TesseraResult<()> {
    upsert_entry(conn, fragment_id, cluster, ValueEntry::seeded(value))
}

pub fn delete_entries(conn: &Connection, fragment_id: &str) -> TesseraResult<()> {
    conn.execute(
        "DELETE FROM fragment_values WHERE fragment_id = ?1",
        params![fragment_id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn cluster_visits(conn: &Connection, cluster: ClusterId) -> TesseraResult<u64> {
    let n: i64 = conn
        .query_row(
            "SELECT COALESCE(SUM(visits), 0) FROM fragment_values WHERE cluster_id = ?1",
            params![cluster],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(n as u64)
}

pub fn count_entries(conn: &Connection) -> TesseraResult<usize> {
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM fragment_values", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(n as usize)
}
