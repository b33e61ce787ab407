//! Relationship (entity → entity edge) operations.

use rusqlite::{params, Connection};
use tracing::debug;

use strata_core::errors::StrataResult;
use strata_core::models::Relationship;

use super::{format_ts, invalid, parse_ts};
use crate::to_storage_err;

type RawRelationship = (
    String,
    String,
    String,
    f64,
    Option<String>,
    Option<String>,
    Option<String>,
);

const RELATIONSHIP_COLUMNS: &str =
    "source_id, target_id, relationship_type, weight, description, valid_from, valid_until";

/// Insert or update a relationship. Returns `false` when a zero weight was skipped.
pub fn upsert_relationship(conn: &Connection, rel: &Relationship) -> StrataResult<bool> {
    if rel.source_id.is_empty() || rel.target_id.is_empty() {
        return Err(invalid("relationship", "endpoints must not be empty"));
    }
    if !rel.weight.is_finite() || !(0.0..=1.0).contains(&rel.weight) {
        return Err(invalid(
            "relationship",
            format!(
                "{} -> {} weight {} outside [0, 1]",
                rel.source_id, rel.target_id, rel.weight
            ),
        ));
    }
    if rel.weight == 0.0 {
        debug!(
            source = %rel.source_id,
            target = %rel.target_id,
            "skipping zero-weight relationship"
        );
        return Ok(false);
    }

    conn.execute(
        "INSERT INTO relationships
            (source_id, target_id, relationship_type, weight, description, valid_from, valid_until)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(source_id, target_id, relationship_type) DO UPDATE SET
            weight = excluded.weight,
            description = excluded.description,
            valid_from = excluded.valid_from,
            valid_until = excluded.valid_until",
        params![
            rel.source_id,
            rel.target_id,
            rel.relationship_type,
            rel.weight,
            rel.description,
            format_ts(rel.valid_from),
            format_ts(rel.valid_until),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(true)
}

/// Every relationship, ordered by (source, target, type).
pub fn get_relationships(conn: &Connection) -> StrataResult<Vec<Relationship>> {
    query_relationships(
        conn,
        &format!(
            "SELECT {RELATIONSHIP_COLUMNS} FROM relationships
             ORDER BY source_id, target_id, relationship_type"
        ),
        None,
    )
}

/// Relationships touching `entity_id` in either direction.
pub fn get_relationships_for_entity(
    conn: &Connection,
    entity_id: &str,
) -> StrataResult<Vec<Relationship>> {
    query_relationships(
        conn,
        &format!(
            "SELECT {RELATIONSHIP_COLUMNS} FROM relationships
             WHERE source_id = ?1 OR target_id = ?1
             ORDER BY source_id, target_id, relationship_type"
        ),
        Some(entity_id),
    )
}

fn query_relationships(
    conn: &Connection,
    sql: &str,
    entity_id: Option<&str>,
) -> StrataResult<Vec<Relationship>> {
    let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;
    let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<RawRelationship> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
        ))
    };
    let raw: Vec<RawRelationship> = match entity_id {
        Some(id) => stmt.query_map(params![id], map_row),
        None => stmt.query_map([], map_row),
    }
    .map_err(|e| to_storage_err(e.to_string()))?
    .collect::<Result<_, _>>()
    .map_err(|e| to_storage_err(e.to_string()))?;

    raw.into_iter()
        .map(
            |(source_id, target_id, relationship_type, weight, description, from, until)| {
                Ok(Relationship {
                    source_id,
                    target_id,
                    relationship_type,
                    weight,
                    description,
                    valid_from: parse_ts(from, "relationship")?,
                    valid_until: parse_ts(until, "relationship")?,
                })
            },
        )
        .collect()
}
