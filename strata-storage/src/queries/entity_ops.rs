//! Entity CRUD and name/alias lookup.

use std::collections::HashMap;

use rusqlite::{params, Connection, OptionalExtension, Row};

use strata_core::errors::StrataResult;
use strata_core::models::Entity;

use super::{bytes_to_f32_vec, embedding_columns, invalid};
use crate::to_storage_err;

const ENTITY_COLUMNS: &str = "id, name, entity_type, description, embedding";

pub(crate) fn parse_entity_row(row: &Row<'_>) -> rusqlite::Result<Entity> {
    let blob: Option<Vec<u8>> = row.get(4)?;
    Ok(Entity {
        id: row.get(0)?,
        name: row.get(1)?,
        entity_type: row.get(2)?,
        description: row.get(3)?,
        aliases: Vec::new(),
        embedding: blob.map(|b| bytes_to_f32_vec(&b)),
    })
}

/// Insert or update an entity and replace its alias set.
pub fn upsert_entity(conn: &Connection, entity: &Entity) -> StrataResult<()> {
    if entity.id.trim().is_empty() {
        return Err(invalid("entity", "id must not be empty"));
    }
    if entity.name.trim().is_empty() {
        return Err(invalid("entity", format!("{} has an empty name", entity.id)));
    }
    let (blob, dims) = embedding_columns(entity.embedding.as_ref());
    conn.execute(
        "INSERT INTO entities (id, name, entity_type, description, embedding, dimensions)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            entity_type = excluded.entity_type,
            description = excluded.description,
            embedding = excluded.embedding,
            dimensions = excluded.dimensions",
        params![
            entity.id,
            entity.name,
            entity.entity_type,
            entity.description,
            blob,
            dims
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    conn.execute(
        "DELETE FROM entity_aliases WHERE entity_id = ?1",
        params![entity.id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    for alias in entity.aliases.iter().filter(|a| !a.trim().is_empty()) {
        conn.execute(
            "INSERT OR IGNORE INTO entity_aliases (entity_id, alias) VALUES (?1, ?2)",
            params![entity.id, alias.trim()],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    Ok(())
}

pub fn get_entity(conn: &Connection, id: &str) -> StrataResult<Option<Entity>> {
    let entity = conn
        .query_row(
            &format!("SELECT {ENTITY_COLUMNS} FROM entities WHERE id = ?1"),
            params![id],
            parse_entity_row,
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    match entity {
        Some(mut entity) => {
            entity.aliases = load_aliases(conn, &entity.id)?;
            Ok(Some(entity))
        }
        None => Ok(None),
    }
}

/// All entities ordered by id, aliases attached.
pub fn get_entities(conn: &Connection) -> StrataResult<Vec<Entity>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {ENTITY_COLUMNS} FROM entities ORDER BY id"))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], parse_entity_row)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut entities = Vec::new();
    for row in rows {
        entities.push(row.map_err(|e| to_storage_err(e.to_string()))?);
    }

    let mut aliases = all_aliases(conn)?;
    for entity in &mut entities {
        if let Some(list) = aliases.remove(&entity.id) {
            entity.aliases = list;
        }
    }
    Ok(entities)
}

/// Entities whose name or alias equals `name`, ignoring case.
pub fn find_entities_by_name(conn: &Connection, name: &str) -> StrataResult<Vec<Entity>> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(Vec::new());
    }
    let mut stmt = conn
        .prepare(
            "SELECT id FROM entities WHERE name = ?1 COLLATE NOCASE
             UNION
             SELECT entity_id FROM entity_aliases WHERE alias = ?1
             ORDER BY 1",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let ids = stmt
        .query_map(params![name], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut entities = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(entity) = get_entity(conn, &id)? {
            entities.push(entity);
        }
    }
    Ok(entities)
}

pub fn count_entities(conn: &Connection) -> StrataResult<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM entities", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count as usize)
}

fn load_aliases(conn: &Connection, entity_id: &str) -> StrataResult<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT alias FROM entity_aliases WHERE entity_id = ?1 ORDER BY alias")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let aliases = stmt
        .query_map(params![entity_id], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<String>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(aliases)
}

fn all_aliases(conn: &Connection) -> StrataResult<HashMap<String, Vec<String>>> {
    let mut stmt = conn
        .prepare("SELECT entity_id, alias FROM entity_aliases ORDER BY entity_id, alias")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for row in rows {
        let (entity_id, alias) = row.map_err(|e| to_storage_err(e.to_string()))?;
        map.entry(entity_id).or_default().push(alias);
    }
    Ok(map)
}
