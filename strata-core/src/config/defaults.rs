// Single source of truth for all default values.

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "strata.db";
pub const DEFAULT_WAL_MODE: bool = true;
pub const DEFAULT_MMAP_SIZE: u64 = 268_435_456; // 256 MB
pub const DEFAULT_CACHE_SIZE: i64 = -64_000; // 64 MB (negative = KB)
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

// --- Hierarchy ---
pub const DEFAULT_MAX_LEVELS: u32 = 3;
pub const DEFAULT_MIN_COMMUNITIES: usize = 1;
pub const DEFAULT_RESOLUTION: f64 = 1.0;
pub const DEFAULT_RESOLUTION_STEP: f64 = 0.0;
pub const DEFAULT_SUMMARY_MAX_MEMBERS: usize = 10;
pub const DEFAULT_ENRICHMENT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_ENRICHMENT_BACKOFF_MS: u64 = 50;
pub const DEFAULT_ENRICHMENT_BACKOFF_MULTIPLIER: f64 = 2.0;

// --- Retrieval ---
pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_MAX_TOP_K: usize = 100;
pub const DEFAULT_MAX_CANDIDATES: usize = 50;
pub const DEFAULT_CANDIDATE_MULTIPLIER: usize = 3;
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_MIN_QUERY_CHARS: usize = 10;
pub const DEFAULT_HYBRID_FUSION: &str = "rrf";
pub const DEFAULT_RRF_K: u32 = 60;
pub const DEFAULT_LEXICAL_WEIGHT: f64 = 0.3;
pub const DEFAULT_VECTOR_WEIGHT: f64 = 0.7;
pub const DEFAULT_MAX_HOPS: usize = 2;
pub const DEFAULT_ENTITY_MATCH_THRESHOLD: f64 = 0.85;
pub const DEFAULT_CO_OCCURRENCE_BOOST: f64 = 0.5;
pub const DEFAULT_HOP_DECAY: f64 = 0.5;
pub const DEFAULT_COMMUNITY_BEAM_WIDTH: usize = 2;
pub const DEFAULT_MAX_DESCENT_DEPTH: usize = 3;

// --- Rerank ---
pub const DEFAULT_RERANK_TOP_N: usize = 10;
pub const DEFAULT_DIVERSITY_ENABLED: bool = true;
pub const DEFAULT_DIVERSITY_THRESHOLD: f64 = 0.9;
pub const DEFAULT_DIVERSITY_DISCOUNT: f64 = 0.5;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_QUERY_LOG_CAPACITY: usize = 10_000;
