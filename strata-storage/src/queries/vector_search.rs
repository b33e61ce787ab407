//! Brute-force cosine similarity search over stored embedding BLOBs.
//!
//! Rows whose dimensions differ from the query are skipped without decoding.
//! Only positive similarities are returned, best first, ties by id.

use std::cmp::Ordering;

use rusqlite::{params, Connection};

use strata_core::errors::StrataResult;
use strata_core::models::{Chunk, Community, Entity};
use strata_core::similarity::cosine_similarity;

use super::{bytes_to_f32_vec, chunk_ops, community_ops, entity_ops};
use crate::to_storage_err;

/// Score `(id, blob, dims)` rows against the query and keep the best `limit`.
fn scan(
    conn: &Connection,
    sql: &str,
    query_embedding: &[f32],
    level: Option<u32>,
    limit: usize,
) -> StrataResult<Vec<(String, f64)>> {
    let norm_sq: f64 = query_embedding
        .iter()
        .map(|x| (*x as f64) * (*x as f64))
        .sum();
    if norm_sq == 0.0 || limit == 0 {
        return Ok(Vec::new());
    }
    let query_len = query_embedding.len() as i64;

    let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;
    let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<(String, Vec<u8>, i64)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    };
    let rows = match level {
        Some(level) => stmt.query_map(params![level], map_row),
        None => stmt.query_map([], map_row),
    }
    .map_err(|e| to_storage_err(e.to_string()))?;

    let mut scored = Vec::new();
    for row in rows {
        let (id, blob, dims) = row.map_err(|e| to_storage_err(e.to_string()))?;
        if dims != query_len {
            continue;
        }
        let sim = cosine_similarity(query_embedding, &bytes_to_f32_vec(&blob));
        if sim > 0.0 {
            scored.push((id, sim));
        }
    }

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(limit);
    Ok(scored)
}

pub fn search_chunks(
    conn: &Connection,
    query_embedding: &[f32],
    limit: usize,
) -> StrataResult<Vec<(Chunk, f64)>> {
    let scored = scan(
        conn,
        "SELECT id, embedding, dimensions FROM chunks WHERE embedding IS NOT NULL",
        query_embedding,
        None,
        limit,
    )?;
    let mut results = Vec::with_capacity(scored.len());
    for (id, sim) in scored {
        if let Some(chunk) = chunk_ops::get_chunk(conn, &id)? {
            results.push((chunk, sim));
        }
    }
    Ok(results)
}

pub fn search_entities(
    conn: &Connection,
    query_embedding: &[f32],
    limit: usize,
) -> StrataResult<Vec<(Entity, f64)>> {
    let scored = scan(
        conn,
        "SELECT id, embedding, dimensions FROM entities WHERE embedding IS NOT NULL",
        query_embedding,
        None,
        limit,
    )?;
    let mut results = Vec::with_capacity(scored.len());
    for (id, sim) in scored {
        if let Some(entity) = entity_ops::get_entity(conn, &id)? {
            results.push((entity, sim));
        }
    }
    Ok(results)
}

pub fn search_communities(
    conn: &Connection,
    query_embedding: &[f32],
    level: Option<u32>,
    limit: usize,
) -> StrataResult<Vec<(Community, f64)>> {
    let sql = match level {
        Some(_) => {
            "SELECT id, embedding, dimensions FROM communities
             WHERE embedding IS NOT NULL AND level = ?1"
        }
        None => "SELECT id, embedding, dimensions FROM communities WHERE embedding IS NOT NULL",
    };
    let scored = scan(conn, sql, query_embedding, level, limit)?;
    let mut results = Vec::with_capacity(scored.len());
    for (id, sim) in scored {
        if let Some(community) = community_ops::get_community(conn, &id)? {
            results.push((community, sim));
        }
    }
    Ok(results)
}
