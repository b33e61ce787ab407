//! v002: communities and their membership.
//!
//! `UNIQUE(member_kind, member_id)` keeps the hierarchy a forest: an entity
//! or community can be absorbed by at most one parent.

use rusqlite::Connection;

use strata_core::errors::StrataResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> StrataResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS communities (
            id           TEXT PRIMARY KEY,
            level        INTEGER NOT NULL CHECK (level >= 1),
            entity_count INTEGER NOT NULL DEFAULT 0,
            summary      TEXT,
            embedding    BLOB,
            dimensions   INTEGER,
            parent_id    TEXT,
            created_at   TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_communities_level ON communities(level);
        CREATE INDEX IF NOT EXISTS idx_communities_parent ON communities(parent_id);

        CREATE TABLE IF NOT EXISTS community_members (
            community_id TEXT NOT NULL REFERENCES communities(id) ON DELETE CASCADE,
            member_kind  TEXT NOT NULL CHECK (member_kind IN ('entity', 'community')),
            member_id    TEXT NOT NULL,
            position     INTEGER NOT NULL,
            PRIMARY KEY (community_id, member_kind, member_id),
            UNIQUE (member_kind, member_id)
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
