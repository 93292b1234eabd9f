/// Configuration validation errors. Raised at construction time, never per query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("quota fractions must sum to 1.0, got {sum}")]
    QuotaSumInvalid { sum: f64 },

    #[error("quota fraction for {bucket} out of range [0, 1]: {value}")]
    QuotaFractionOutOfRange { bucket: String, value: f64 },

    #[error("weight references unconfigured dimension: {dimension}")]
    UnknownWeightDimension { dimension: String },

    #[error("weight for {source_name} must be a non-negative number, got {weight}")]
    InvalidWeight { source_name: String, weight: f64 },

    #[error("dimension configured more than once: {name}")]
    DuplicateDimension { name: String },

    #[error("namespace {namespace} is shared by dimensions {first} and {second}")]
    DuplicateNamespace {
        namespace: String,
        first: String,
        second: String,
    },

    #[error("dimension name must not be empty")]
    EmptyDimensionName,

    #[error("at least one dimension must be configured")]
    NoDimensions,

    #[error("dimension {dimension} declares zero vector dimensionality")]
    ZeroDimensionality { dimension: String },

    #[error("max_depth must be between 1 and {max}, got {depth}")]
    DepthOutOfRange { depth: usize, max: usize },

    #[error("{field} must be greater than zero")]
    ZeroValue { field: String },

    #[error("config parse error: {reason}")]
    Parse { reason: String },
}
