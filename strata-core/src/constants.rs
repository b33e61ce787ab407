/// Strata system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Level assigned to the first clustering pass over raw entities.
pub const FIRST_COMMUNITY_LEVEL: u32 = 1;

/// Hard ceiling on hierarchy depth regardless of configuration.
pub const MAX_HIERARCHY_LEVELS: u32 = 16;

/// Hard ceiling on relationship hops for expansion and traversal.
pub const MAX_GRAPH_HOPS: usize = 6;

/// Maximum number of entity names a classifier may report for one query.
pub const MAX_QUERY_ENTITIES: usize = 10;

/// Salience assigned to a mention when the extractor did not provide one.
pub const DEFAULT_MENTION_SALIENCE: f64 = 0.5;

/// Number of hex characters of the member hash used in community ids.
pub const COMMUNITY_ID_HASH_LEN: usize = 16;
