//! SQL query modules, one per record family.

pub mod chunk_ops;
pub mod community_ops;
pub mod entity_ops;
pub mod lexical_search;
pub mod relationship_ops;
pub mod vector_search;

use chrono::{DateTime, Utc};

use strata_core::errors::{StorageError, StrataResult};

/// Convert f32 slice to bytes (little-endian).
pub(crate) fn f32_vec_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes back to f32 vec.
pub(crate) fn bytes_to_f32_vec(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Embedding column pair: `(blob, dimensions)`.
pub(crate) fn embedding_columns(embedding: Option<&Vec<f32>>) -> (Option<Vec<u8>>, Option<i64>) {
    match embedding {
        Some(v) if !v.is_empty() => (Some(f32_vec_to_bytes(v)), Some(v.len() as i64)),
        _ => (None, None),
    }
}

pub(crate) fn format_ts(ts: Option<DateTime<Utc>>) -> Option<String> {
    ts.map(|t| t.to_rfc3339())
}

pub(crate) fn parse_ts(raw: Option<String>, record: &str) -> StrataResult<Option<DateTime<Utc>>> {
    raw.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| {
                StorageError::InvalidRecord {
                    record: record.to_string(),
                    reason: format!("bad timestamp {s:?}: {e}"),
                }
                .into()
            })
    })
    .transpose()
}

pub(crate) fn invalid(record: &str, reason: impl Into<String>) -> strata_core::StrataError {
    StorageError::InvalidRecord {
        record: record.to_string(),
        reason: reason.into(),
    }
    .into()
}
