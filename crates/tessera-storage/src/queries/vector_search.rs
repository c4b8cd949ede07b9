//! Brute-force cosine similarity search over stored embeddings.

use rusqlite::{params, Connection};

use tessera_core::errors::TesseraResult;
use tessera_core::fragment::Fragment;
use tessera_core::vector::{cosine_similarity, is_zero};

use crate::to_storage_err;

/// Search fragments by cosine similarity to `query_embedding`.
/// Returns `(fragment, similarity)` pairs with similarity `>= threshold`,
/// best first, at most `limit`.
pub fn search_similar(
    conn: &Connection,
    query_embedding: &[f32],
    threshold: f64,
    limit: usize,
) -> TesseraResult<Vec<(Fragment, f64)>> {
    // Zero-norm queries match nothing.
    if is_zero(query_embedding) || limit == 0 {
        return Ok(vec![]);
    }
    let query_len = query_embedding.len() as i64;

    let mut stmt = conn
        .prepare("SELECT id, embedding FROM fragments WHERE dimensions = ?1")
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![query_len], |row| {
            let id: String = row.get(0)?;
            let blob: Vec<u8> = row.get(1)?;
            Ok((id, blob))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut scored: Vec<(String, f64)> = Vec::new();
    for row in rows {
        let (id, blob) = row.map_err(|e| to_storage_err(e.to_string()))?;
        let stored = bytes_to_f32_vec(&blob);
        let sim = cosine_similarity(query_embedding, &stored);
        if sim >= threshold {
            scored.push((id, sim));
        }
    }

    // Sort by similarity descending.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);

    let mut results = Vec::with_capacity(scored.len());
    for (id, sim) in scored {
        if let Some(fragment) = super::fragment_crud::get_fragment(conn, &id)? {
            results.push((fragment, sim));
        }
    }
    Ok(results)
}

/// Up to `limit` embeddings taken at an even stride across insertion order.
pub fn sample_embeddings(conn: &Connection, limit: usize) -> TesseraResult<Vec<Vec<f32>>> {
    if limit == 0 {
        return Ok(vec![]);
    }
    let total = super::fragment_crud::count_fragments(conn)?;
    let stride = (total / limit).max(1);

    let mut stmt = conn
        .prepare("SELECT embedding FROM fragments ORDER BY seq")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, Vec<u8>>(0))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut sample = Vec::with_capacity(limit.min(total));
    for (i, row) in rows.enumerate() {
        if sample.len() >= limit {
            break;
        }
        if i % stride != 0 {
            continue;
        }
        let blob = row.map_err(|e| to_storage_err(e.to_string()))?;
        sample.push(bytes_to_f32_vec(&blob));
    }
    Ok(sample)
}

/// Convert f32 slice to bytes (little-endian).
pub(crate) fn f32_vec_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert little-endian bytes back to an f32 vec.
pub(crate) fn bytes_to_f32_vec(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}
