/// Data model for computed folder statistics.
///
/// Re-exports the composed `FolderStats` artifact and supporting types.
pub mod size;
pub mod stats;

pub use size::format_size;
pub use stats::{
    CacheInfo, FolderStats, MediaStats, MetadataSummary, PromptAnalysis, TagCount, WordCount,
};
