//! FTS5 keyword search over chunk text.

use rusqlite::{params, Connection};

use strata_core::errors::StrataResult;
use strata_core::models::Chunk;

use super::chunk_ops::{parse_chunk_row, CHUNK_COLUMNS};
use crate::to_storage_err;

/// Turn free text into an FTS5 expression: quoted alphanumeric terms joined by OR.
///
/// Returns `None` when nothing searchable remains.
pub fn sanitize_fts_query(query: &str) -> Option<String> {
    let mut terms: Vec<String> = Vec::new();
    for raw in query.split(|c: char| !c.is_alphanumeric()) {
        if raw.is_empty() {
            continue;
        }
        let term = raw.to_lowercase();
        if !terms.contains(&term) {
            terms.push(term);
        }
    }
    if terms.is_empty() {
        return None;
    }
    Some(
        terms
            .iter()
            .map(|t| format!("\"{t}\""))
            .collect::<Vec<_>>()
            .join(" OR "),
    )
}

/// Chunks ranked by BM25. Scores are negated so higher is better.
pub fn search_chunks(conn: &Connection, query: &str, limit: usize) -> StrataResult<Vec<(Chunk, f64)>> {
    let Some(expression) = sanitize_fts_query(query) else {
        return Ok(Vec::new());
    };
    if limit == 0 {
        return Ok(Vec::new());
    }

    let mut stmt = conn
        .prepare(&format!(
            "SELECT {CHUNK_COLUMNS}, bm25(chunk_fts) AS score
             FROM chunk_fts
             JOIN chunks c ON c.rowid = chunk_fts.rowid
             WHERE chunk_fts MATCH ?1
             ORDER BY score, c.id
             LIMIT ?2"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![expression, limit as i64], |row| {
            Ok((parse_chunk_row(row)?, -row.get::<_, f64>(5)?))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_quotes_and_dedupes_terms() {
        assert_eq!(
            sanitize_fts_query("Acme, acme AND \"Globex\"?").as_deref(),
            Some("\"acme\" OR \"and\" OR \"globex\"")
        );
    }

    #[test]
    fn sanitize_empty_query() {
        assert!(sanitize_fts_query("  ?! ").is_none());
    }
}
