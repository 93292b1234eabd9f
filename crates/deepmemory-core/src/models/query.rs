use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MetadataFilter;

/// A retrieval request. Immutable once built.
///
/// ```
/// use deepmemory_core::models::Query;
///
/// let query = Query::new("How should I approach Jordy about the launch?")
///     .with_seeds(["Jordy", "Launch"]);
/// assert_eq!(query.seeds(), ["Jordy", "Launch"]);
/// assert!(query.filter().is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    id: Uuid,
    text: String,
    filter: Option<MetadataFilter>,
    seeds: Vec<String>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            filter: None,
            seeds: Vec::new(),
        }
    }

    /// Restrict vector search to records whose metadata matches `filter`.
    pub fn with_filter(mut self, filter: MetadataFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Explicit graph seed entities. Blank names are dropped, duplicates keep
    /// their first position.
    pub fn with_seeds<I, S>(mut self, seeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for seed in seeds {
            let seed = seed.into().trim().to_string();
            if !seed.is_empty() && !self.seeds.contains(&seed) {
                self.seeds.push(seed);
            }
        }
        self
    }

    /// Correlation id for log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn filter(&self) -> Option<&MetadataFilter> {
        self.filter.as_ref()
    }

    pub fn seeds(&self) -> &[String] {
        &self.seeds
    }
}
