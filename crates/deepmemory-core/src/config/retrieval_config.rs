use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants::{MAX_TRAVERSAL_DEPTH, QUOTA_SUM_TOLERANCE};
use crate::errors::ConfigError;
use crate::models::Bucket;

/// One embedding space searched per query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionSpec {
    pub name: String,
    /// Prefix prepended to the query before embedding. `None` embeds verbatim.
    #[serde(default)]
    pub instruction: Option<String>,
    /// Index namespace. Defaults to the dimension name.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Declared vector length D for this dimension's namespace.
    #[serde(default = "default_dimensionality")]
    pub dimensions: usize,
    /// Bucket for candidates found only through this dimension.
    #[serde(default)]
    pub bucket: Option<Bucket>,
}

fn default_dimensionality() -> usize {
    defaults::DEFAULT_EMBEDDING_DIMENSIONS
}

impl DimensionSpec {
    /// A dimension that embeds the query verbatim.
    pub fn verbatim(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instruction: None,
            namespace: None,
            dimensions: defaults::DEFAULT_EMBEDDING_DIMENSIONS,
            bucket: None,
        }
    }

    /// A dimension that embeds `"<instruction> <query>"`.
    pub fn instructed(name: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            instruction: Some(instruction.into()),
            ..Self::verbatim(name)
        }
    }

    pub fn semantic() -> Self {
        Self::verbatim(defaults::SEMANTIC_DIMENSION)
    }

    pub fn sentiment() -> Self {
        Self::instructed(defaults::SENTIMENT_DIMENSION, defaults::SENTIMENT_INSTRUCTION)
    }

    pub fn strategic() -> Self {
        Self::instructed(defaults::STRATEGIC_DIMENSION, defaults::STRATEGIC_INSTRUCTION)
    }

    pub fn temporal() -> Self {
        Self {
            bucket: Some(Bucket::TemporalContext),
            ..Self::instructed(defaults::TEMPORAL_DIMENSION, defaults::TEMPORAL_INSTRUCTION)
        }
    }

    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_bucket(mut self, bucket: Bucket) -> Self {
        self.bucket = Some(bucket);
        self
    }

    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or(&self.name)
    }

    /// Whether the query text is embedded unchanged.
    pub fn is_verbatim(&self) -> bool {
        self.instruction.is_none()
    }

    /// Text actually sent to the embedding provider.
    pub fn render(&self, text: &str) -> String {
        match &self.instruction {
            Some(instruction) => format!("{instruction} {text}"),
            None => text.to_string(),
        }
    }

    /// Bucket for candidates found only through this dimension.
    pub fn bucket_affinity(&self) -> Bucket {
        self.bucket.unwrap_or(if self.is_verbatim() {
            Bucket::DirectMatch
        } else {
            Bucket::LateralConnection
        })
    }
}

/// Target share of `max_total` per bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaPlan {
    pub direct_match: f64,
    pub lateral_connection: f64,
    pub relationship_map: f64,
    pub contradiction_flag: f64,
    pub temporal_context: f64,
}

impl Default for QuotaPlan {
    fn default() -> Self {
        Self {
            direct_match: defaults::DIRECT_MATCH_FRACTION,
            lateral_connection: defaults::LATERAL_CONNECTION_FRACTION,
            relationship_map: defaults::RELATIONSHIP_MAP_FRACTION,
            contradiction_flag: defaults::CONTRADICTION_FLAG_FRACTION,
            temporal_context: defaults::TEMPORAL_CONTEXT_FRACTION,
        }
    }
}

impl QuotaPlan {
    pub fn fraction(&self, bucket: Bucket) -> f64 {
        match bucket {
            Bucket::DirectMatch => self.direct_match,
            Bucket::LateralConnection => self.lateral_connection,
            Bucket::RelationshipMap => self.relationship_map,
            Bucket::ContradictionFlag => self.contradiction_flag,
            Bucket::TemporalContext => self.temporal_context,
        }
    }

    pub fn sum(&self) -> f64 {
        Bucket::ALL.iter().map(|b| self.fraction(*b)).sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for bucket in Bucket::ALL {
            let value = self.fraction(bucket);
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::QuotaFractionOutOfRange {
                    bucket: bucket.to_string(),
                    value,
                });
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > QUOTA_SUM_TOLERANCE {
            return Err(ConfigError::QuotaSumInvalid { sum });
        }
        Ok(())
    }
}

/// Per-call timeouts. Exceeding one empties that branch only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub embedding_ms: u64,
    pub search_ms: u64,
    /// Budget for the whole graph traversal, not each hop.
    pub graph_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            embedding_ms: defaults::DEFAULT_EMBEDDING_TIMEOUT_MS,
            search_ms: defaults::DEFAULT_SEARCH_TIMEOUT_MS,
            graph_ms: defaults::DEFAULT_GRAPH_TIMEOUT_MS,
        }
    }
}

impl TimeoutConfig {
    pub fn embedding(&self) -> Duration {
        Duration::from_millis(self.embedding_ms)
    }

    pub fn search(&self) -> Duration {
        Duration::from_millis(self.search_ms)
    }

    pub fn graph(&self) -> Duration {
        Duration::from_millis(self.graph_ms)
    }
}

/// Retrieval engine configuration. Supplied once at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Embedding spaces, in priority order.
    pub dimensions: Vec<DimensionSpec>,
    /// Fusion weight per dimension name. Missing entries weigh 1.0.
    pub weights: BTreeMap<String, f64>,
    /// Fusion weight of the graph-traversal source.
    pub graph_weight: f64,
    /// RRF smoothing constant.
    pub rrf_k: u32,
    /// Hits requested per namespace.
    pub top_k: usize,
    /// Maximum hops from a seed.
    pub max_depth: usize,
    /// Maximum nodes a traversal reports.
    pub max_nodes: usize,
    /// Relationship types the traversal may follow. Empty allows all.
    pub relationship_whitelist: Vec<String>,
    pub quota_plan: QuotaPlan,
    /// Hard cap on evidence items per package.
    pub max_total: usize,
    /// Hand unused bucket slots to candidates skipped by full buckets.
    pub redistribute_unused_quota: bool,
    pub timeouts: TimeoutConfig,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            dimensions: vec![
                DimensionSpec::semantic(),
                DimensionSpec::sentiment(),
                DimensionSpec::strategic(),
            ],
            weights: BTreeMap::from([
                (defaults::SEMANTIC_DIMENSION.to_string(), defaults::SEMANTIC_WEIGHT),
                (defaults::SENTIMENT_DIMENSION.to_string(), defaults::SENTIMENT_WEIGHT),
                (defaults::STRATEGIC_DIMENSION.to_string(), defaults::STRATEGIC_WEIGHT),
            ]),
            graph_weight: defaults::DEFAULT_GRAPH_WEIGHT,
            rrf_k: defaults::DEFAULT_RRF_K,
            top_k: defaults::DEFAULT_TOP_K,
            max_depth: defaults::DEFAULT_MAX_DEPTH,
            max_nodes: defaults::DEFAULT_MAX_NODES,
            relationship_whitelist: defaults::DEFAULT_RELATIONSHIP_WHITELIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
            quota_plan: QuotaPlan::default(),
            max_total: defaults::DEFAULT_MAX_TOTAL,
            redistribute_unused_quota: defaults::DEFAULT_REDISTRIBUTE,
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl RetrievalConfig {
    /// Parse a bare `RetrievalConfig` from TOML and validate it.
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn dimension(&self, name: &str) -> Option<&DimensionSpec> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    /// Fusion weight for a dimension.
    pub fn weight_for(&self, dimension: &str) -> f64 {
        self.weights
            .get(dimension)
            .copied()
            .unwrap_or(defaults::DEFAULT_DIMENSION_WEIGHT)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dimensions.is_empty() {
            return Err(ConfigError::NoDimensions);
        }

        let mut namespaces: HashMap<&str, &str> = HashMap::new();
        for (i, dim) in self.dimensions.iter().enumerate() {
            if dim.name.trim().is_empty() {
                return Err(ConfigError::EmptyDimensionName);
            }
            if self.dimensions[..i].iter().any(|d| d.name == dim.name) {
                return Err(ConfigError::DuplicateDimension {
                    name: dim.name.clone(),
                });
            }
            if let Some(first) = namespaces.insert(dim.namespace(), &dim.name) {
                return Err(ConfigError::DuplicateNamespace {
                    namespace: dim.namespace().to_string(),
                    first: first.to_string(),
                    second: dim.name.clone(),
                });
            }
            if dim.dimensions == 0 {
                return Err(ConfigError::ZeroDimensionality {
                    dimension: dim.name.clone(),
                });
            }
        }

        for (name, weight) in &self.weights {
            if self.dimension(name).is_none() {
                return Err(ConfigError::UnknownWeightDimension {
                    dimension: name.clone(),
                });
            }
            check_weight(name, *weight)?;
        }
        check_weight("graph", self.graph_weight)?;

        for (field, value) in [
            ("top_k", self.top_k),
            ("max_total", self.max_total),
            ("max_nodes", self.max_nodes),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroValue {
                    field: field.to_string(),
                });
            }
        }
        if self.max_depth == 0 || self.max_depth > MAX_TRAVERSAL_DEPTH {
            return Err(ConfigError::DepthOutOfRange {
                depth: self.max_depth,
                max: MAX_TRAVERSAL_DEPTH,
            });
        }

        self.quota_plan.validate()
    }
}

fn check_weight(source: &str, weight: f64) -> Result<(), ConfigError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidWeight {
            source_name: source.to_string(),
            weight,
        })
    }
}
