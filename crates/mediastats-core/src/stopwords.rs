/// Prompt-analysis stopword set and its swap-on-write manager.
///
/// Filtering happens in the scan hot path, so lookups go through an
/// immutable snapshot (`Arc<StopwordSet>`). Updates build a whole new set
/// and swap the pointer; computations already running keep the snapshot
/// they started with.
use compact_str::CompactString;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

/// Built-in English stopwords used when no custom set is configured.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is",
    "it", "its", "of", "on", "that", "the", "to", "was", "will", "with", "i", "you", "we",
    "they", "this", "but", "or", "not", "if", "can", "my", "your", "all", "one", "two", "more",
    "been", "have", "had", "do", "does", "done", "so", "up", "out", "about", "into", "through",
    "during", "before", "after", "above", "below", "between", "under", "again", "further",
    "then", "once", "there", "when", "where", "why", "how", "both", "each", "few", "most",
    "other", "some", "such", "no", "nor", "only", "own", "same", "than", "too", "very", "just",
];

/// An immutable stopword snapshot.
///
/// Entries are stored lowercased; `contains` expects the caller to pass
/// already-lowercased tokens, which the prompt tokenizer guarantees.
#[derive(Debug, Clone)]
pub struct StopwordSet {
    words: HashSet<CompactString>,
}

impl StopwordSet {
    /// The built-in default set.
    pub fn builtin() -> Self {
        Self::from_words(DEFAULT_STOPWORDS.iter().copied())
    }

    /// Build a set from arbitrary input: words are trimmed and lowercased,
    /// empty entries dropped, duplicates collapsed.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .map(CompactString::from)
            .collect();
        Self { words }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// All words in lexical order, for listing back to callers.
    pub fn words_sorted(&self) -> Vec<String> {
        let mut words: Vec<String> = self.words.iter().map(|w| w.to_string()).collect();
        words.sort_unstable();
        words
    }
}

/// Shared, updatable handle to the active stopword set.
#[derive(Debug)]
pub struct StopwordManager {
    current: RwLock<Arc<StopwordSet>>,
}

impl StopwordManager {
    /// Start with the built-in default set.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(StopwordSet::builtin())),
        }
    }

    /// Start with a custom set, used when a persisted set exists at startup.
    pub fn with_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            current: RwLock::new(Arc::new(StopwordSet::from_words(words))),
        }
    }

    /// The current set. Cheap to call; computations hold the returned `Arc`
    /// for their whole run.
    pub fn snapshot(&self) -> Arc<StopwordSet> {
        self.current.read().clone()
    }

    /// Swap in a new set built from `words`. Returns the new set's size
    /// after normalization.
    pub fn replace<I, S>(&self, words: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let next = Arc::new(StopwordSet::from_words(words));
        let len = next.len();
        *self.current.write() = next;
        len
    }

    /// Restore the built-in default set. Returns its size.
    pub fn reset(&self) -> usize {
        let next = Arc::new(StopwordSet::builtin());
        let len = next.len();
        *self.current.write() = next;
        len
    }

    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }

    pub fn words_sorted(&self) -> Vec<String> {
        self.current.read().words_sorted()
    }
}

impl Default for StopwordManager {
    fn default() -> Self {
        Self::new()
    }
}
