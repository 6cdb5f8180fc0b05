/// Composes one scan plus the aggregation passes into a `FolderStats`.
///
/// The pipeline is synchronous and self-contained: callers hand it a folder,
/// an index, a stopword snapshot, and options, and get back the full
/// artifact. Long-running coordination (caching, deduplication, worker
/// scheduling) lives with the caller.
use crate::analysis::{metadata, tags, words};
use crate::error::StatsError;
use crate::index::{MediaIndex, TagRef};
use crate::media::MediaKind;
use crate::model::{CacheInfo, FolderStats, MediaStats, MetadataSummary};
use crate::scanner;
use crate::stopwords::StopwordSet;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Knobs for one computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub recursive: bool,
    /// When false the model/size summary is skipped; background refreshes
    /// use this to keep precomputation cheap.
    pub include_metadata: bool,
    /// Cap on how many media files get tag/prompt/metadata analysis.
    /// Population counters always cover the whole scan.
    pub analysis_limit: Option<usize>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            include_metadata: true,
            analysis_limit: None,
        }
    }
}

/// Scan `folder` and aggregate statistics over its media files.
///
/// The analysis subset is the first `analysis_limit` media files in walk
/// order, so repeated runs over an unchanged tree analyze the same files.
/// `cache_info` in the result is left at its default; cache provenance is
/// the caller's concern.
pub fn compute_folder_stats(
    folder: &Path,
    index: &dyn MediaIndex,
    stopwords: &StopwordSet,
    options: &AnalysisOptions,
) -> Result<FolderStats, StatsError> {
    let start = Instant::now();
    debug!(folder = %folder.display(), ?options, "computing folder statistics");

    let scan = scanner::scan_folder(folder, options.recursive)?;

    let subset_len = options
        .analysis_limit
        .map_or(scan.media_files.len(), |limit| limit.min(scan.media_files.len()));

    let mut media_stats = MediaStats {
        analyzed_count: subset_len as u64,
        limit_applied: subset_len < scan.media_files.len(),
        ..MediaStats::default()
    };

    let mut tag_lists: Vec<Vec<TagRef>> = Vec::new();
    let mut metadata_texts: Vec<String> = Vec::new();

    for (position, file) in scan.media_files.iter().enumerate() {
        match file.kind {
            MediaKind::Image => media_stats.total_images += 1,
            MediaKind::Video => media_stats.total_videos += 1,
        }

        // Population-wide: indexed means the index knows the file at all.
        let Some(record) = index.lookup(&file.path) else {
            continue;
        };
        media_stats.indexed_media += 1;

        if position >= subset_len {
            continue;
        }
        if record.has_tags() {
            media_stats.tagged_images += 1;
            tag_lists.push(record.tags);
        }
        if let Some(text) = record.generation_metadata {
            if !text.trim().is_empty() {
                metadata_texts.push(text);
            }
        }
    }

    // Unindexed and untagged subset members both count as untagged.
    media_stats.untagged_images = media_stats.analyzed_count - media_stats.tagged_images;

    let tagged = media_stats.tagged_images;
    let include_metadata = options.include_metadata;
    let (top_tags, (prompt_analysis, metadata_summary)) = rayon::join(
        || tags::aggregate_tags(tag_lists.iter().map(|l| l.as_slice()), tagged),
        || {
            rayon::join(
                || words::analyse_prompts(metadata_texts.iter().map(|s| s.as_str()), stopwords),
                || {
                    if include_metadata {
                        metadata::summarise_metadata(metadata_texts.iter().map(|s| s.as_str()))
                    } else {
                        MetadataSummary::default()
                    }
                },
            )
        },
    );

    info!(
        folder = %folder.display(),
        files = scan.file_count,
        media = scan.media_file_count(),
        analyzed = media_stats.analyzed_count,
        skipped = scan.skipped_entries,
        size = %crate::model::format_size(scan.total_size_bytes),
        elapsed = ?start.elapsed(),
        "folder statistics computed"
    );

    Ok(FolderStats {
        folder_path: folder.display().to_string(),
        recursive: options.recursive,
        file_count: scan.file_count,
        subfolder_count: scan.subfolder_count,
        total_size_bytes: scan.total_size_bytes,
        media_file_count: scan.media_file_count(),
        media_stats,
        top_tags,
        prompt_analysis,
        metadata_summary,
        analysis_limit: options.analysis_limit,
        cache_info: CacheInfo::default(),
    })
}
