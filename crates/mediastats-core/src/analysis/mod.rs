/// Aggregation passes over the analyzed media subset.
///
/// Each pass is a pure function from per-file inputs to one sub-record of
/// `FolderStats`; the pipeline fans them out in parallel.
pub mod metadata;
pub mod tags;
pub mod words;

pub use metadata::{summarise_metadata, TOP_METADATA};
pub use tags::{aggregate_tags, TOP_TAGS};
pub use words::{analyse_prompts, extract_positive_prompt, TOP_WORDS};
