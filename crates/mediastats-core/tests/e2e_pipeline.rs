/// End-to-end statistics pipeline tests.
///
/// These exercise the real `compute_folder_stats` path against a real
/// temporary filesystem: parallel traversal, media classification, and all
/// three aggregation passes, with an in-memory media index standing in for
/// the external one. No OS interface is mocked.
use mediastats_core::{
    compute_folder_stats, AnalysisOptions, IndexRecord, MemoryIndex, StopwordSet, TagRef,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn write_file(path: &Path, bytes: &[u8]) {
    fs::write(path, bytes).unwrap();
}

fn tag(id: i64, name: &str) -> TagRef {
    TagRef {
        id,
        name: name.into(),
        tag_type: "custom".into(),
        display_name: None,
    }
}

/// Reproducible gallery tree:
///
/// ```text
/// root/
///   one.png     indexed, tagged landscape, prompt metadata
///   two.png     indexed, tagged landscape, prompt metadata
///   three.png   not indexed
///   clip.mp4    indexed, no tags, no metadata
///   notes.txt   not media
///   albums/
///     four.jpg  indexed, tagged landscape + portrait, JSON metadata
/// ```
fn build_gallery(root: &Path) -> MemoryIndex {
    let albums = root.join("albums");
    fs::create_dir(&albums).unwrap();

    write_file(&root.join("one.png"), &[0u8; 100]);
    write_file(&root.join("two.png"), &[0u8; 100]);
    write_file(&root.join("three.png"), &[0u8; 100]);
    write_file(&root.join("clip.mp4"), &[0u8; 500]);
    write_file(&root.join("notes.txt"), b"not media");
    write_file(&albums.join("four.jpg"), &[0u8; 200]);

    let mut index = MemoryIndex::new();
    index.insert(
        root.join("one.png"),
        IndexRecord {
            tags: vec![tag(5, "landscape")],
            generation_metadata: Some(
                "misty mountain lake\nNegative prompt: blurry\nSteps: 20, Size: 512x768, Model: dreamshaper_8"
                    .to_string(),
            ),
        },
    );
    index.insert(
        root.join("two.png"),
        IndexRecord {
            tags: vec![tag(5, "landscape")],
            generation_metadata: Some(
                "mountain sunrise\nSteps: 20, Size: 512x768, Model: dreamshaper_8".to_string(),
            ),
        },
    );
    index.insert(
        root.join("clip.mp4"),
        IndexRecord {
            tags: Vec::new(),
            generation_metadata: None,
        },
    );
    index.insert(
        albums.join("four.jpg"),
        IndexRecord {
            tags: vec![tag(5, "landscape"), tag(9, "portrait")],
            generation_metadata: Some(r#"{"model": "analog-diffusion", "size": "1024x1024"}"#.to_string()),
        },
    );
    index
}

fn compute(root: &Path, index: &MemoryIndex, options: &AnalysisOptions) -> mediastats_core::FolderStats {
    compute_folder_stats(root, index, &StopwordSet::builtin(), options).unwrap()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// Three images, two tagged "landscape" (tag_id 5), one untagged: the tag
/// ranking must show exactly one entry with count 2 at 100 percent of tagged
/// images, and the tagged/untagged split must cover all three.
#[test]
fn tag_ranking_over_partially_tagged_folder() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_file(&root.join("a.png"), &[0u8; 10]);
    write_file(&root.join("b.png"), &[0u8; 10]);
    write_file(&root.join("c.png"), &[0u8; 10]);

    let mut index = MemoryIndex::new();
    for name in ["a.png", "b.png"] {
        index.insert(
            root.join(name),
            IndexRecord {
                tags: vec![tag(5, "landscape")],
                generation_metadata: None,
            },
        );
    }

    let stats = compute(root, &index, &AnalysisOptions::default());

    assert_eq!(stats.media_stats.tagged_images, 2);
    assert_eq!(stats.media_stats.untagged_images, 1);
    assert_eq!(stats.top_tags.len(), 1);
    assert_eq!(stats.top_tags[0].tag_id, 5);
    assert_eq!(stats.top_tags[0].tag_name, "landscape");
    assert_eq!(stats.top_tags[0].count, 2);
    assert_eq!(stats.top_tags[0].percentage, 100.0);
}

/// Structural invariants that must hold for any folder.
#[test]
fn count_invariants_hold() {
    let tmp = TempDir::new().unwrap();
    let index = build_gallery(tmp.path());

    let stats = compute(tmp.path(), &index, &AnalysisOptions::default());

    assert!(stats.file_count >= stats.media_file_count);
    assert_eq!(stats.file_count, 6);
    assert_eq!(stats.subfolder_count, 1);
    assert_eq!(stats.media_file_count, 5);
    assert_eq!(stats.media_stats.total_images, 4);
    assert_eq!(stats.media_stats.total_videos, 1);
    assert_eq!(stats.media_stats.indexed_media, 4);
    assert_eq!(
        stats.media_stats.tagged_images + stats.media_stats.untagged_images,
        stats.media_stats.analyzed_count
    );
}

#[test]
fn shallow_mode_ignores_nested_media() {
    let tmp = TempDir::new().unwrap();
    let index = build_gallery(tmp.path());

    let options = AnalysisOptions {
        recursive: false,
        ..AnalysisOptions::default()
    };
    let stats = compute(tmp.path(), &index, &options);

    assert!(!stats.recursive);
    assert_eq!(stats.media_file_count, 4, "four.jpg sits one level down");
    assert_eq!(stats.subfolder_count, 1);
    // The nested image's tags must not leak into a shallow analysis.
    assert!(stats.top_tags.iter().all(|t| t.tag_id != 9));
}

/// The analysis subset is the first N media files in walk order (depth
/// first, siblings name-sorted), so a limit of 2 lands on albums/four.jpg
/// and clip.mp4 in the gallery tree.
#[test]
fn analysis_limit_selects_walk_order_prefix() {
    let tmp = TempDir::new().unwrap();
    let index = build_gallery(tmp.path());

    let options = AnalysisOptions {
        analysis_limit: Some(2),
        ..AnalysisOptions::default()
    };
    let stats = compute(tmp.path(), &index, &options);

    assert_eq!(stats.media_stats.analyzed_count, 2);
    assert!(stats.media_stats.limit_applied);
    // four.jpg is tagged, clip.mp4 is not.
    assert_eq!(stats.media_stats.tagged_images, 1);
    assert_eq!(stats.media_stats.untagged_images, 1);
    // Population counters still cover everything.
    assert_eq!(stats.media_stats.total_images, 4);
    assert_eq!(stats.media_stats.total_videos, 1);
    assert_eq!(stats.media_stats.indexed_media, 4);
}

#[test]
fn prompt_and_metadata_aggregation() {
    let tmp = TempDir::new().unwrap();
    let index = build_gallery(tmp.path());

    let stats = compute(tmp.path(), &index, &AnalysisOptions::default());

    // one.png and two.png carry textual prompts; four.jpg's JSON blob has no
    // marker lines so the whole text counts as its prompt.
    assert_eq!(stats.prompt_analysis.total_prompts_analyzed, 3);
    let mountain = stats
        .prompt_analysis
        .top_words
        .iter()
        .find(|w| w.word == "mountain")
        .expect("mountain ranked");
    assert_eq!(mountain.count, 2);

    assert_eq!(stats.metadata_summary.models.get("dreamshaper_8"), Some(&2));
    assert_eq!(stats.metadata_summary.models.get("analog-diffusion"), Some(&1));
    assert_eq!(stats.metadata_summary.sizes.get("512x768"), Some(&2));
    assert_eq!(stats.metadata_summary.sizes.get("1024x1024"), Some(&1));
}

/// Adding a stopword that covers a ranked word removes it from the next
/// run's ranking; the built-in set restores the original ranking.
#[test]
fn stopword_changes_rerank_words() {
    let tmp = TempDir::new().unwrap();
    let index = build_gallery(tmp.path());
    let options = AnalysisOptions::default();

    let custom = StopwordSet::from_words(["mountain"]);
    let filtered =
        compute_folder_stats(tmp.path(), &index, &custom, &options).unwrap();
    assert!(filtered
        .prompt_analysis
        .top_words
        .iter()
        .all(|w| w.word != "mountain"));

    let restored =
        compute_folder_stats(tmp.path(), &index, &StopwordSet::builtin(), &options).unwrap();
    assert!(restored
        .prompt_analysis
        .top_words
        .iter()
        .any(|w| w.word == "mountain"));
}

/// Two runs over an unchanged tree produce identical artifacts, including
/// serialized form; the cache layer depends on this.
#[test]
fn repeated_computation_is_identical() {
    let tmp = TempDir::new().unwrap();
    let index = build_gallery(tmp.path());
    let options = AnalysisOptions::default();

    let first = compute(tmp.path(), &index, &options);
    let second = compute(tmp.path(), &index, &options);

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
