/// MediaStats Core — scanning, aggregation, and data model.
///
/// This crate contains all statistics logic with zero HTTP or database
/// dependencies. It is designed to be reusable across different frontends
/// (HTTP service, CLI, batch jobs).
///
/// # Modules
///
/// - [`model`] — The composed `FolderStats` artifact and its sub-records.
/// - [`scanner`] — Parallel filesystem traversal with per-entry error tolerance.
/// - [`media`] — Image/video classification by extension.
/// - [`index`] — The media-index collaborator boundary and an in-memory impl.
/// - [`stopwords`] — The prompt-analysis exclusion set and its manager.
/// - [`analysis`] — Tag, prompt-word, and generation-metadata aggregation.
/// - [`pipeline`] — Composes a full scan plus aggregation into one `FolderStats`.
pub mod analysis;
pub mod error;
pub mod index;
pub mod media;
pub mod model;
pub mod pipeline;
pub mod scanner;
pub mod stopwords;

pub use error::StatsError;
pub use index::{IndexRecord, MediaIndex, MemoryIndex, TagRef};
pub use media::MediaKind;
pub use model::{
    CacheInfo, FolderStats, MediaStats, MetadataSummary, PromptAnalysis, TagCount, WordCount,
};
pub use pipeline::{compute_folder_stats, AnalysisOptions};
pub use scanner::{scan_folder, MediaFile, ScanOutcome};
pub use stopwords::{StopwordManager, StopwordSet, DEFAULT_STOPWORDS};
