//! Fragment insert/get/delete/list queries.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use tessera_core::errors::{StorageError, TesseraResult};
use tessera_core::fragment::{Fragment, Provenance};

use super::vector_search::{bytes_to_f32_vec, f32_vec_to_bytes};
use crate::to_storage_err;

const SELECT_COLUMNS: &str = "id, content, content_hash, embedding, dimensions, importance_weight, \
     keywords, provenance, scope, created_at";

/// Raw column values, decoded outside the rusqlite row callback so JSON and
/// timestamp failures surface as workspace errors.
struct RawRow {
    id: String,
    content: String,
    content_hash: String,
    embedding: Vec<u8>,
    dimensions: i64,
    importance_weight: f64,
    keywords: String,
    provenance: String,
    scope: Option<String>,
    created_at: String,
}

fn read_raw(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id: row.get(0)?,
        content: row.get(1)?,
        content_hash: row.get(2)?,
        embedding: row.get(3)?,
        dimensions: row.get(4)?,
        importance_weight: row.get(5)?,
        keywords: row.get(6)?,
        provenance: row.get(7)?,
        scope: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn decode(raw: RawRow) -> TesseraResult<Fragment> {
    let embedding = bytes_to_f32_vec(&raw.embedding);
    if embedding.len() as i64 != raw.dimensions {
        return Err(StorageError::CorruptRow {
            id: raw.id,
            details: format!(
                "embedding blob holds {} floats, row says {}",
                embedding.len(),
                raw.dimensions
            ),
        }
        .into());
    }
    let keywords: Vec<String> = serde_json::from_str(&raw.keywords)?;
    let provenance: Provenance = serde_json::from_str(&raw.provenance)?;
    let created_at = DateTime::parse_from_rfc3339(&raw.created_at)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| StorageError::CorruptRow {
            id: raw.id.clone(),
            details: format!("bad created_at: {e}"),
        })?;

    Ok(Fragment {
        id: raw.id,
        content: raw.content,
        embedding,
        importance_weight: raw.importance_weight,
        keywords,
        provenance,
        scope: raw.scope,
        content_hash: raw.content_hash,
        created_at,
    })
}

/// Insert a single fragment.
pub fn insert_fragment(conn: &Connection, fragment: &Fragment) -> TesseraResult<()> {
    let keywords = serde_json::to_string(&fragment.keywords)?;
    let provenance = serde_json::to_string(&fragment.provenance)?;
    conn.execute(
        "INSERT INTO fragments (id, content, content_hash, embedding, dimensions,
            importance_weight, keywords, provenance, scope, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            fragment.id,
            fragment.content,
            fragment.content_hash,
            f32_vec_to_bytes(&fragment.embedding),
            fragment.embedding.len() as i64,
            fragment.importance_weight,
            keywords,
            provenance,
            fragment.scope,
            fragment.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(format!("insert fragment {}: {e}", fragment.id)))?;
    Ok(())
}

/// Insert many fragments inside one transaction. All-or-nothing.
pub fn bulk_insert(conn: &Connection, fragments: &[Fragment]) -> TesseraResult<usize> {
    conn.execute_batch("SAVEPOINT bulk_insert")
        .map_err(|e| to_storage_err(format!("bulk_insert savepoint: {e}")))?;

    for fragment in fragments {
        if let Err(e) = insert_fragment(conn, fragment) {
            let _ = conn.execute_batch("ROLLBACK TO bulk_insert");
            let _ = conn.execute_batch("RELEASE bulk_insert");
            return Err(e);
        }
    }

    conn.execute_batch("RELEASE bulk_insert")
        .map_err(|e| to_storage_err(format!("bulk_insert release: {e}")))?;
    Ok(fragments.len())
}

pub fn get_fragment(conn: &Connection, id: &str) -> TesseraResult<Option<Fragment>> {
    let raw = conn
        .query_row(
            &format!("SELECT {SELECT_COLUMNS} FROM fragments WHERE id = ?1"),
            params![id],
            read_raw,
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(decode).transpose()
}

/// Fetch fragments in the order of `ids`, skipping unknown ids.
pub fn bulk_get(conn: &Connection, ids: &[String]) -> TesseraResult<Vec<Fragment>> {
    let mut stmt = conn
        .prepare_cached(&format!("SELECT {SELECT_COLUMNS} FROM fragments WHERE id = ?1"))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        let raw = stmt
            .query_row(params![id], read_raw)
            .optional()
            .map_err(|e| to_storage_err(e.to_string()))?;
        if let Some(raw) = raw {
            out.push(decode(raw)?);
        }
    }
    Ok(out)
}

pub fn get_by_content_hash(conn: &Connection, hash: &str) -> TesseraResult<Option<Fragment>> {
    let raw = conn
        .query_row(
            &format!(
                "SELECT {SELECT_COLUMNS} FROM fragments WHERE content_hash = ?1 ORDER BY seq LIMIT 1"
            ),
            params![hash],
            read_raw,
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(decode).transpose()
}

/// Delete a fragment. Its value entries cascade.
pub fn delete_fragment(conn: &Connection, id: &str) -> TesseraResult<()> {
    conn.execute("DELETE FROM fragments WHERE id = ?1", params![id])
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// All fragments in insertion order, optionally filtered by scope.
pub fn list_fragments(conn: &Connection, scope: Option<&str>) -> TesseraResult<Vec<Fragment>> {
    let (sql, scoped) = match scope {
        Some(_) => (
            format!("SELECT {SELECT_COLUMNS} FROM fragments WHERE scope = ?1 ORDER BY seq"),
            true,
        ),
        None => (
            format!("SELECT {SELECT_COLUMNS} FROM fragments ORDER BY seq"),
            false,
        ),
    };
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = if scoped {
        stmt.query_map(params![scope], read_raw)
            .and_then(|mapped| mapped.collect::<rusqlite::Result<Vec<RawRow>>>())
    } else {
        stmt.query_map([], read_raw)
            .and_then(|mapped| mapped.collect::<rusqlite::Result<Vec<RawRow>>>())
    };
    let raws = rows.map_err(|e| to_storage_err(e.to_string()))?;

    raws.into_iter().map(decode).collect()
}

pub fn count_fragments(conn: &Connection) -> TesseraResult<usize> {
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM fragments", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(n as usize)
}
