//! Serializable context brief built from an evidence package.

use std::fmt::Write as _;

use deepmemory_core::constants::{CONTENT_KEY, CONVERSATION_ID_KEY, TIMESTAMP_KEY};
use deepmemory_core::models::{Bucket, CandidateKey, EvidenceItem, EvidencePackage, Metadata};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Characters of content kept per item in the text rendering.
pub const DEFAULT_ITEM_CHAR_BUDGET: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BriefItem {
    /// Display form of the candidate key, e.g. `vector:abc` or `node:Person:Jordy`.
    pub key: String,
    pub fused_rank: usize,
    pub score: f64,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_distance: Option<usize>,
    /// Dimensions that ranked this item.
    pub dimensions: Vec<String>,
}

/// Provenance of a vector-backed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefSource {
    pub conversation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextBrief {
    pub query_id: Uuid,
    pub direct_matches: Vec<BriefItem>,
    pub lateral_connections: Vec<BriefItem>,
    pub relationship_map: Vec<BriefItem>,
    pub contradictions: Vec<BriefItem>,
    pub temporal_context: Vec<BriefItem>,
    /// Distinct conversation sources, in fused order of first appearance.
    pub sources: Vec<BriefSource>,
    /// Degraded branches, one line each.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

fn text_field(metadata: &Metadata, key: &str) -> Option<String> {
    metadata.get(key).and_then(Value::as_str).map(str::to_string)
}

fn node_content(metadata: &Metadata, key: &str) -> String {
    let mut content = match (text_field(metadata, "label"), text_field(metadata, "name")) {
        (Some(label), Some(name)) => format!("{label}: {name}"),
        _ => key.to_string(),
    };
    let path: Vec<&str> = metadata
        .get("path")
        .and_then(Value::as_array)
        .map(|p| p.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if !path.is_empty() {
        let _ = write!(content, " (via {})", path.join(", "));
    }
    content
}

impl BriefItem {
    fn from_evidence(item: &EvidenceItem) -> Self {
        let candidate = &item.candidate;
        let metadata = &candidate.metadata;
        let content = match &candidate.key {
            CandidateKey::Vector(id) => text_field(metadata, CONTENT_KEY).unwrap_or_else(|| id.clone()),
            CandidateKey::Node(key) => node_content(metadata, key),
        };
        Self {
            key: candidate.key.to_string(),
            fused_rank: item.fused_rank,
            score: candidate.score,
            content,
            source: text_field(metadata, "source"),
            conversation_id: text_field(metadata, CONVERSATION_ID_KEY),
            timestamp: text_field(metadata, TIMESTAMP_KEY),
            graph_distance: candidate.graph_distance,
            dimensions: candidate.dimensions().map(str::to_string).collect(),
        }
    }
}

impl ContextBrief {
    pub fn from_package(package: &EvidencePackage) -> Self {
        let section = |bucket: Bucket| -> Vec<BriefItem> {
            package.bucket(bucket).iter().map(BriefItem::from_evidence).collect()
        };

        let mut sources: Vec<BriefSource> = Vec::new();
        for item in package.items() {
            if !matches!(item.candidate.key, CandidateKey::Vector(_)) {
                continue;
            }
            let metadata = &item.candidate.metadata;
            let Some(conversation_id) = text_field(metadata, CONVERSATION_ID_KEY) else {
                continue;
            };
            let source = BriefSource {
                conversation_id,
                timestamp: text_field(metadata, TIMESTAMP_KEY),
            };
            if !sources.contains(&source) {
                sources.push(source);
            }
        }

        Self {
            query_id: package.query_id,
            direct_matches: section(Bucket::DirectMatch),
            lateral_connections: section(Bucket::LateralConnection),
            relationship_map: section(Bucket::RelationshipMap),
            contradictions: section(Bucket::ContradictionFlag),
            temporal_context: section(Bucket::TemporalContext),
            sources,
            warnings: package.warnings.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.sections().iter().map(|(_, items)| items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sections(&self) -> [(&'static str, &[BriefItem]); 5] {
        [
            ("Direct Matches", self.direct_matches.as_slice()),
            ("Lateral Connections", self.lateral_connections.as_slice()),
            ("Relationship Map", self.relationship_map.as_slice()),
            ("Contradictions", self.contradictions.as_slice()),
            ("Temporal Context", self.temporal_context.as_slice()),
        ]
    }

    /// Plain-text rendering with [`DEFAULT_ITEM_CHAR_BUDGET`] per item.
    pub fn render_text(&self) -> String {
        self.render_text_with_budget(DEFAULT_ITEM_CHAR_BUDGET)
    }

    /// Plain-text rendering. Empty sections are omitted; each item's content is
    /// cut to `char_budget` characters.
    pub fn render_text_with_budget(&self, char_budget: usize) -> String {
        let mut blocks = Vec::new();
        for (title, items) in self.sections() {
            if items.is_empty() {
                continue;
            }
            let mut block = format!("{title}:");
            for item in items {
                let _ = write!(block, "\n- [#{} {:.4}] ", item.fused_rank, item.score);
                if let Some(distance) = item.graph_distance {
                    let _ = write!(block, "(depth {distance}) ");
                }
                block.push_str(&truncate(&item.content, char_budget));
                let provenance: Vec<&str> = [&item.source, &item.timestamp]
                    .into_iter()
                    .filter_map(|f| f.as_deref())
                    .collect();
                if !provenance.is_empty() {
                    let _ = write!(block, " ({})", provenance.join(", "));
                }
            }
            blocks.push(block);
        }
        if !self.sources.is_empty() {
            let mut block = String::from("Sources:");
            for source in &self.sources {
                match &source.timestamp {
                    Some(ts) => {
                        let _ = write!(block, "\n- {} @ {ts}", source.conversation_id);
                    }
                    None => {
                        let _ = write!(block, "\n- {}", source.conversation_id);
                    }
                }
            }
            blocks.push(block);
        }
        blocks.join("\n\n")
    }
}

fn truncate(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepmemory_core::models::{Contribution, FusedCandidate, QuotaCounts, SourceId};
    use serde_json::json;

    fn evidence(key: CandidateKey, bucket: Bucket, rank: usize, meta: Value) -> EvidenceItem {
        EvidenceItem {
            fused_rank: rank,
            bucket,
            candidate: FusedCandidate {
                key,
                score: 0.01,
                best_rank: 1,
                origins: vec![Contribution {
                    source: SourceId::Dimension("semantic".into()),
                    rank: 1,
                    weight: 1.0,
                    term: 0.01,
                }],
                metadata: serde_json::from_value(meta).unwrap(),
                graph_distance: None,
            },
        }
    }

    fn package(items: Vec<EvidenceItem>) -> EvidencePackage {
        let mut package = EvidencePackage::empty(Uuid::nil(), 10, QuotaCounts::default());
        for item in items {
            package.buckets.entry(item.bucket).or_default().push(item);
        }
        package
    }

    #[test]
    fn truncates_by_characters() {
        assert_eq!(truncate("héllo", 2), "hé...");
        assert_eq!(truncate("hi", 5), "hi");
    }

    #[test]
    fn sources_are_distinct_and_ordered() {
        let brief = ContextBrief::from_package(&package(vec![
            evidence(CandidateKey::Vector("b".into()), Bucket::LateralConnection, 2,
                json!({"conversation_id": "c1", "timestamp": "t1"})),
            evidence(CandidateKey::Vector("a".into()), Bucket::DirectMatch, 1,
                json!({"conversation_id": "c2"})),
            evidence(CandidateKey::Vector("c".into()), Bucket::DirectMatch, 3,
                json!({"conversation_id": "c1", "timestamp": "t1"})),
        ]));
        let ids: Vec<&str> = brief.sources.iter().map(|s| s.conversation_id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c1"]);
        assert_eq!(brief.len(), 3);
    }

    #[test]
    fn render_respects_budget() {
        let long = "x".repeat(600);
        let brief = ContextBrief::from_package(&package(vec![evidence(
            CandidateKey::Vector("a".into()),
            Bucket::DirectMatch,
            1,
            json!({"content": long}),
        )]));
        let text = brief.render_text();
        assert!(text.starts_with("Direct Matches:"));
        assert!(text.contains(&format!("{}...", "x".repeat(500))));
        assert!(!text.contains(&"x".repeat(501)));
        assert!(!text.contains("Contradictions:"));
    }

    #[test]
    fn node_items_describe_path() {
        let brief = ContextBrief::from_package(&package(vec![evidence(
            CandidateKey::Node("Project:Launch".into()),
            Bucket::RelationshipMap,
            1,
            json!({"label": "Project", "name": "Launch", "path": ["Person:Jordy -[WORKS_ON]-> Project:Launch"]}),
        )]));
        assert_eq!(
            brief.relationship_map[0].content,
            "Project: Launch (via Person:Jordy -[WORKS_ON]-> Project:Launch)"
        );
        assert!(brief.sources.is_empty());
    }
}
