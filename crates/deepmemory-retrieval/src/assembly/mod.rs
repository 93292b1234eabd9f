//! Evidence Assembler: quota-bounded buckets and the context brief.

mod assembler;
mod brief;
mod quota;

pub use assembler::{is_contradiction, EvidenceAssembler};
pub use brief::{BriefItem, BriefSource, ContextBrief, DEFAULT_ITEM_CHAR_BUDGET};
pub use quota::quota_counts;
