//! v001: entities, aliases, relationships, chunks, and chunk → entity mentions.

use rusqlite::Connection;

use strata_core::errors::StrataResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> StrataResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS entities (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            embedding   BLOB,
            dimensions  INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_entities_name ON entities(name COLLATE NOCASE);

        CREATE TABLE IF NOT EXISTS entity_aliases (
            entity_id TEXT NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
            alias     TEXT NOT NULL COLLATE NOCASE,
            PRIMARY KEY (entity_id, alias)
        );
        CREATE INDEX IF NOT EXISTS idx_entity_aliases_alias ON entity_aliases(alias);

        CREATE TABLE IF NOT EXISTS relationships (
            source_id         TEXT NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
            target_id         TEXT NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
            relationship_type TEXT NOT NULL,
            weight            REAL NOT NULL CHECK (weight > 0.0 AND weight <= 1.0),
            description       TEXT,
            valid_from        TEXT,
            valid_until       TEXT,
            PRIMARY KEY (source_id, target_id, relationship_type)
        );
        CREATE INDEX IF NOT EXISTS idx_relationships_source ON relationships(source_id);
        CREATE INDEX IF NOT EXISTS idx_relationships_target ON relationships(target_id);

        CREATE TABLE IF NOT EXISTS chunks (
            id          TEXT PRIMARY KEY,
            document_id TEXT NOT NULL,
            text        TEXT NOT NULL,
            chunk_index INTEGER NOT NULL DEFAULT 0,
            embedding   BLOB,
            dimensions  INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_chunks_document ON chunks(document_id, chunk_index);

        CREATE TABLE IF NOT EXISTS chunk_mentions (
            chunk_id  TEXT NOT NULL REFERENCES chunks(id) ON DELETE CASCADE,
            entity_id TEXT NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
            salience  REAL NOT NULL DEFAULT 0.5 CHECK (salience >= 0.0 AND salience <= 1.0),
            PRIMARY KEY (chunk_id, entity_id)
        );
        CREATE INDEX IF NOT EXISTS idx_chunk_mentions_entity ON chunk_mentions(entity_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
