/// The composed statistics artifact and its sub-records.
///
/// These are wire types: their serde shape is the JSON contract of the HTTP
/// surface, and the cache persists them as serialized blobs. Collection
/// fields use ordered containers so repeated serialization of the same
/// computation is byte-identical.
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate statistics for one folder, as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderStats {
    pub folder_path: String,
    pub recursive: bool,
    pub file_count: u64,
    pub subfolder_count: u64,
    pub total_size_bytes: u64,
    pub media_file_count: u64,
    pub media_stats: MediaStats,
    pub top_tags: Vec<TagCount>,
    pub prompt_analysis: PromptAnalysis,
    pub metadata_summary: MetadataSummary,
    /// The analysis cap this computation ran under, `None` for unlimited.
    pub analysis_limit: Option<usize>,
    pub cache_info: CacheInfo,
}

/// Media population and analysis-subset counters.
///
/// `total_images`, `total_videos`, and `indexed_media` describe the full
/// scanned media population. `tagged_images`, `untagged_images`, and
/// `analyzed_count` describe the bounded analysis subset, so
/// `tagged_images + untagged_images == analyzed_count` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaStats {
    pub total_images: u64,
    pub total_videos: u64,
    pub indexed_media: u64,
    pub tagged_images: u64,
    pub untagged_images: u64,
    pub analyzed_count: u64,
    pub limit_applied: bool,
}

/// One ranked tag with its frequency among the analyzed subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag_id: i64,
    pub tag_name: CompactString,
    pub tag_type: CompactString,
    pub display_name: Option<CompactString>,
    pub count: u64,
    /// `count / tagged_images * 100`, one decimal place.
    pub percentage: f64,
}

/// One ranked prompt word with its frequency among all filtered tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: CompactString,
    pub count: u64,
    /// `count / total_words_found * 100`, one decimal place.
    pub percentage: f64,
}

/// Prompt word-frequency results for the analyzed subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptAnalysis {
    /// Images whose extracted positive prompt was non-empty.
    pub total_prompts_analyzed: u64,
    /// Token occurrences that survived filtering, the percentage denominator.
    pub total_words_found: u64,
    pub top_words: Vec<WordCount>,
}

/// Model-name and image-size frequency mappings.
///
/// Ordered maps so serialization is deterministic; consumers sort by count
/// themselves if they want ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataSummary {
    pub models: BTreeMap<String, u64>,
    pub sizes: BTreeMap<String, u64>,
}

/// Cache provenance attached to every response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheInfo {
    /// `true` when this response was served from the cache.
    pub is_cached: bool,
    pub computed_at: Option<DateTime<Utc>>,
    /// `true` only for cache hits whose fingerprint still matched.
    pub cache_valid: bool,
}
