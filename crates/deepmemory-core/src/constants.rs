/// DeepMemory version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Vectors per request when a backend upserts in batches.
pub const UPSERT_BATCH_SIZE: usize = 100;

/// Multiplier on `top_k` when a filter must be applied after the index query.
pub const LOCAL_FILTER_OVERFETCH: usize = 10;

/// Tolerance when checking that quota fractions sum to 1.0.
pub const QUOTA_SUM_TOLERANCE: f64 = 1e-6;

/// Metadata key marking an evidence item as contradicting other evidence.
pub const CONTRADICTION_KEY: &str = "contradiction";

/// Metadata key holding a list of free-form flags.
pub const FLAGS_KEY: &str = "flags";

/// Metadata key holding the source conversation id of a vector record.
pub const CONVERSATION_ID_KEY: &str = "conversation_id";

/// Metadata key holding the ISO-8601 timestamp of a vector record.
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Metadata key holding the text content of a vector record.
pub const CONTENT_KEY: &str = "content";

/// Hard ceiling on graph traversal depth regardless of configuration.
pub const MAX_TRAVERSAL_DEPTH: usize = 16;
