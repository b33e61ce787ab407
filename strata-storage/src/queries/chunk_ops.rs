//! Chunk and mention operations.

use rusqlite::{params, Connection, OptionalExtension, Row};

use strata_core::errors::StrataResult;
use strata_core::models::{Chunk, ChunkMention};

use super::{bytes_to_f32_vec, embedding_columns, invalid};
use crate::to_storage_err;

pub(crate) const CHUNK_COLUMNS: &str = "c.id, c.document_id, c.text, c.chunk_index, c.embedding";

pub(crate) fn parse_chunk_row(row: &Row<'_>) -> rusqlite::Result<Chunk> {
    let blob: Option<Vec<u8>> = row.get(4)?;
    Ok(Chunk {
        id: row.get(0)?,
        document_id: row.get(1)?,
        text: row.get(2)?,
        chunk_index: row.get(3)?,
        embedding: blob.map(|b| bytes_to_f32_vec(&b)),
    })
}

pub fn upsert_chunk(conn: &Connection, chunk: &Chunk) -> StrataResult<()> {
    if chunk.id.trim().is_empty() {
        return Err(invalid("chunk", "id must not be empty"));
    }
    let (blob, dims) = embedding_columns(chunk.embedding.as_ref());
    conn.execute(
        "INSERT INTO chunks (id, document_id, text, chunk_index, embedding, dimensions)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
            document_id = excluded.document_id,
            text = excluded.text,
            chunk_index = excluded.chunk_index,
            embedding = excluded.embedding,
            dimensions = excluded.dimensions",
        params![
            chunk.id,
            chunk.document_id,
            chunk.text,
            chunk.chunk_index,
            blob,
            dims
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_chunk(conn: &Connection, id: &str) -> StrataResult<Option<Chunk>> {
    conn.query_row(
        &format!("SELECT {CHUNK_COLUMNS} FROM chunks c WHERE c.id = ?1"),
        params![id],
        parse_chunk_row,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn add_mention(conn: &Connection, mention: &ChunkMention) -> StrataResult<()> {
    if !mention.salience.is_finite() || !(0.0..=1.0).contains(&mention.salience) {
        return Err(invalid(
            "mention",
            format!(
                "{} -> {} salience {} outside [0, 1]",
                mention.chunk_id, mention.entity_id, mention.salience
            ),
        ));
    }
    conn.execute(
        "INSERT INTO chunk_mentions (chunk_id, entity_id, salience) VALUES (?1, ?2, ?3)
         ON CONFLICT(chunk_id, entity_id) DO UPDATE SET salience = excluded.salience",
        params![mention.chunk_id, mention.entity_id, mention.salience],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Chunks mentioning the entity, most salient first, then by chunk id.
pub fn get_chunks_mentioning_entity(
    conn: &Connection,
    entity_id: &str,
) -> StrataResult<Vec<(Chunk, f64)>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {CHUNK_COLUMNS}, m.salience
             FROM chunk_mentions m
             JOIN chunks c ON c.id = m.chunk_id
             WHERE m.entity_id = ?1
             ORDER BY m.salience DESC, c.id"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![entity_id], |row| {
            Ok((parse_chunk_row(row)?, row.get::<_, f64>(5)?))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}
