//! Rank Fusion Merger.

mod rrf_fusion;

pub use rrf_fusion::{fuse, fuse_ranked_lists, RankedItem, RankedSource};
