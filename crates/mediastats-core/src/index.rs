/// The media-index collaborator boundary.
///
/// Tags and generation metadata live in an external index maintained by the
/// wider application. The engine sees that index only through [`MediaIndex`],
/// keyed by absolute file path. A file without a record is simply unindexed,
/// never an error.
use compact_str::CompactString;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One tag attached to an indexed media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    pub id: i64,
    pub name: CompactString,
    pub tag_type: CompactString,
    pub display_name: Option<CompactString>,
}

/// Everything the index knows about a single media file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexRecord {
    pub tags: Vec<TagRef>,
    /// Raw generation-parameter text as stored by the indexer, if any.
    pub generation_metadata: Option<String>,
}

impl IndexRecord {
    pub fn has_tags(&self) -> bool {
        !self.tags.is_empty()
    }
}

/// Read-only lookup into the media index.
///
/// Implementations must be callable from worker threads; the pipeline runs
/// lookups inside the blocking scan path.
pub trait MediaIndex: Send + Sync {
    /// The record for `path`, or `None` when the file is not indexed.
    fn lookup(&self, path: &Path) -> Option<IndexRecord>;
}

/// Map-backed index.
///
/// This is both the materialized form database snapshots load into and the
/// index handed to the pipeline in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    records: HashMap<PathBuf, IndexRecord>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, record: IndexRecord) {
        self.records.insert(path.into(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl MediaIndex for MemoryIndex {
    fn lookup(&self, path: &Path) -> Option<IndexRecord> {
        self.records.get(path).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(id: i64, name: &str) -> TagRef {
        TagRef {
            id,
            name: name.into(),
            tag_type: "custom".into(),
            display_name: None,
        }
    }

    #[test]
    fn lookup_returns_inserted_record() {
        let mut index = MemoryIndex::new();
        index.insert(
            "/gallery/a.png",
            IndexRecord {
                tags: vec![tag(1, "landscape")],
                generation_metadata: Some("mountain\nSteps: 20".to_string()),
            },
        );

        let record = index.lookup(Path::new("/gallery/a.png")).unwrap();
        assert!(record.has_tags());
        assert_eq!(record.tags[0].name, "landscape");
    }

    #[test]
    fn lookup_missing_path_is_none() {
        let index = MemoryIndex::new();
        assert!(index.lookup(Path::new("/gallery/unknown.png")).is_none());
    }

    #[test]
    fn record_without_tags() {
        let record = IndexRecord {
            tags: Vec::new(),
            generation_metadata: Some("text".to_string()),
        };
        assert!(!record.has_tags());
    }
}
