//! Community records and membership.

use std::collections::HashMap;

use rusqlite::{params, Connection, OptionalExtension, Row};

use strata_core::errors::StrataResult;
use strata_core::models::{Community, NodeKind, NodeRef};

use super::{bytes_to_f32_vec, embedding_columns, invalid, parse_ts};
use crate::to_storage_err;

type RawCommunity = (
    String,
    u32,
    i64,
    Option<String>,
    Option<Vec<u8>>,
    Option<String>,
    String,
);

const COMMUNITY_COLUMNS: &str =
    "id, level, entity_count, summary, embedding, parent_id, created_at";

fn raw_community(row: &Row<'_>) -> rusqlite::Result<RawCommunity> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn build_community(raw: RawCommunity, members: Vec<NodeRef>) -> StrataResult<Community> {
    let (id, level, entity_count, summary, blob, parent_id, created_at) = raw;
    let created_at = parse_ts(Some(created_at), "community")?.unwrap_or_default();
    Ok(Community {
        id,
        level,
        members,
        entity_count: entity_count.max(0) as usize,
        summary,
        embedding: blob.map(|b| bytes_to_f32_vec(&b)),
        parent_id,
        created_at,
    })
}

pub fn insert_community(conn: &Connection, community: &Community) -> StrataResult<()> {
    if community.level == 0 {
        return Err(invalid(
            "community",
            format!("{} has level 0; levels start at 1", community.id),
        ));
    }
    let (blob, dims) = embedding_columns(community.embedding.as_ref());
    conn.execute(
        "INSERT INTO communities
            (id, level, entity_count, summary, embedding, dimensions, parent_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            community.id,
            community.level,
            community.entity_count as i64,
            community.summary,
            blob,
            dims,
            community.parent_id,
            community.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Attach members to a community. Member communities get it as their parent.
pub fn link_members(conn: &Connection, members: &[NodeRef], community_id: &str) -> StrataResult<()> {
    let mut stmt = conn
        .prepare(
            "INSERT INTO community_members (community_id, member_kind, member_id, position)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    for (position, member) in members.iter().enumerate() {
        stmt.execute(params![
            community_id,
            member.kind.as_str(),
            member.id,
            position as i64
        ])
        .map_err(|e| to_storage_err(format!("link {member} -> {community_id}: {e}")))?;

        if member.kind == NodeKind::Community {
            conn.execute(
                "UPDATE communities SET parent_id = ?1 WHERE id = ?2",
                params![community_id, member.id],
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
        }
    }
    Ok(())
}

pub fn get_community(conn: &Connection, id: &str) -> StrataResult<Option<Community>> {
    let raw = conn
        .query_row(
            &format!("SELECT {COMMUNITY_COLUMNS} FROM communities WHERE id = ?1"),
            params![id],
            raw_community,
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    match raw {
        Some(raw) => {
            let members = load_members(conn, Some(id))?.remove(id).unwrap_or_default();
            Ok(Some(build_community(raw, members)?))
        }
        None => Ok(None),
    }
}

/// All communities ordered by level then id, members in insertion order.
pub fn get_all_communities(conn: &Connection) -> StrataResult<Vec<Community>> {
    query_communities(
        conn,
        &format!("SELECT {COMMUNITY_COLUMNS} FROM communities ORDER BY level, id"),
        None,
    )
}

/// Communities at one level, or all levels when `level` is `None`.
pub fn get_communities_at_level(
    conn: &Connection,
    level: Option<u32>,
) -> StrataResult<Vec<Community>> {
    match level {
        Some(level) => query_communities(
            conn,
            &format!("SELECT {COMMUNITY_COLUMNS} FROM communities WHERE level = ?1 ORDER BY id"),
            Some(level),
        ),
        None => get_all_communities(conn),
    }
}

pub fn clear_communities(conn: &Connection) -> StrataResult<()> {
    conn.execute_batch(
        "DELETE FROM community_members;
         DELETE FROM communities;",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Discard all communities and write the new set. Caller provides the transaction.
pub fn replace_hierarchy(conn: &Connection, communities: &[Community]) -> StrataResult<()> {
    clear_communities(conn)?;
    for community in communities {
        insert_community(conn, community)?;
    }
    for community in communities {
        link_members(conn, &community.members, &community.id)?;
    }
    Ok(())
}

fn query_communities(
    conn: &Connection,
    sql: &str,
    level: Option<u32>,
) -> StrataResult<Vec<Community>> {
    let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;
    let raws: Vec<RawCommunity> = match level {
        Some(level) => stmt.query_map(params![level], raw_community),
        None => stmt.query_map([], raw_community),
    }
    .map_err(|e| to_storage_err(e.to_string()))?
    .collect::<Result<_, _>>()
    .map_err(|e| to_storage_err(e.to_string()))?;

    let mut members = load_members(conn, None)?;
    raws.into_iter()
        .map(|raw| {
            let m = members.remove(&raw.0).unwrap_or_default();
            build_community(raw, m)
        })
        .collect()
}

fn load_members(
    conn: &Connection,
    community_id: Option<&str>,
) -> StrataResult<HashMap<String, Vec<NodeRef>>> {
    let sql = match community_id {
        Some(_) => {
            "SELECT community_id, member_kind, member_id FROM community_members
             WHERE community_id = ?1 ORDER BY community_id, position"
        }
        None => {
            "SELECT community_id, member_kind, member_id FROM community_members
             ORDER BY community_id, position"
        }
    };
    let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;
    let map_row = |row: &Row<'_>| -> rusqlite::Result<(String, String, String)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    };
    let rows: Vec<(String, String, String)> = match community_id {
        Some(id) => stmt.query_map(params![id], map_row),
        None => stmt.query_map([], map_row),
    }
    .map_err(|e| to_storage_err(e.to_string()))?
    .collect::<Result<_, _>>()
    .map_err(|e| to_storage_err(e.to_string()))?;

    let mut map: HashMap<String, Vec<NodeRef>> = HashMap::new();
    for (community, kind, member) in rows {
        let node = match kind.as_str() {
            "entity" => NodeRef::entity(member),
            "community" => NodeRef::community(member),
            other => {
                return Err(invalid(
                    "community_member",
                    format!("unknown member kind {other:?} in {community}"),
                ))
            }
        };
        map.entry(community).or_default().push(node);
    }
    Ok(map)
}
