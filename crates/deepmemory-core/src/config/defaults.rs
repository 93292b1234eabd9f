// Single source of truth for all default values.

// --- Dimensions ---
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1024;
pub const DEFAULT_DIMENSION_WEIGHT: f64 = 1.0;
pub const SEMANTIC_DIMENSION: &str = "semantic";
pub const SENTIMENT_DIMENSION: &str = "sentiment";
pub const STRATEGIC_DIMENSION: &str = "strategic";
pub const TEMPORAL_DIMENSION: &str = "temporal";
pub const SENTIMENT_INSTRUCTION: &str = "Emotional tone and interpersonal dynamics:";
pub const STRATEGIC_INSTRUCTION: &str = "Goals, decisions, and strategic implications:";
pub const TEMPORAL_INSTRUCTION: &str = "Change or evolution in thinking:";
pub const SEMANTIC_WEIGHT: f64 = 0.4;
pub const SENTIMENT_WEIGHT: f64 = 0.3;
pub const STRATEGIC_WEIGHT: f64 = 0.3;

// --- Fusion ---
pub const DEFAULT_RRF_K: u32 = 60;
pub const DEFAULT_GRAPH_WEIGHT: f64 = 0.3;

// --- Search ---
pub const DEFAULT_TOP_K: usize = 50;

// --- Graph ---
pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_MAX_NODES: usize = 50;
pub const DEFAULT_RELATIONSHIP_WHITELIST: [&str; 4] =
    ["KNOWS", "WORKS_ON", "RELATES_TO", "MENTIONED_IN"];

// --- Assembly ---
pub const DEFAULT_MAX_TOTAL: usize = 50;
pub const DEFAULT_REDISTRIBUTE: bool = true;
pub const DIRECT_MATCH_FRACTION: f64 = 0.20;
pub const LATERAL_CONNECTION_FRACTION: f64 = 0.30;
pub const RELATIONSHIP_MAP_FRACTION: f64 = 0.20;
pub const CONTRADICTION_FLAG_FRACTION: f64 = 0.10;
pub const TEMPORAL_CONTEXT_FRACTION: f64 = 0.20;

// --- Timeouts ---
pub const DEFAULT_EMBEDDING_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_SEARCH_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_GRAPH_TIMEOUT_MS: u64 = 5_000;

// --- Embedding provider ---
pub const DEFAULT_EMBEDDING_PROVIDER: &str = "hashing";
pub const DEFAULT_EMBEDDING_MODEL: &str = "BAAI/bge-large-en-v1.5";
pub const DEFAULT_EMBEDDING_API_KEY_ENV: &str = "DEEPMEMORY_EMBEDDING_API_KEY";
pub const DEFAULT_EMBEDDING_MAX_RETRIES: u32 = 3;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
