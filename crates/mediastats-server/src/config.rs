/// Runtime configuration and the allowed-roots path policy.
use std::path::{Path, PathBuf};

/// Settings the binary resolves from flags and environment and hands to the
/// service. Bind address and port stay with the binary; everything here
/// shapes request handling.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory prefixes requests may reference. Empty means unrestricted.
    pub allowed_roots: Vec<PathBuf>,
    /// Bearer token required on every request; `None` disables auth.
    pub api_token: Option<String>,
    /// Reject mutating requests (cache clears, stopword changes, precompute).
    pub read_only: bool,
    /// How many folder computations may run at once.
    pub max_concurrent_scans: usize,
    /// How many of those may be background precompute jobs.
    pub background_workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_roots: Vec::new(),
            api_token: None,
            read_only: false,
            max_concurrent_scans: num_cpus::get().max(1),
            background_workers: 4,
        }
    }
}

/// Prefix policy over canonicalized paths.
///
/// Roots are canonicalized at construction so prefix checks agree with the
/// canonicalized paths the orchestrator works on; a root that does not exist
/// yet is kept as given.
#[derive(Debug, Clone, Default)]
pub struct PathPolicy {
    roots: Vec<PathBuf>,
}

impl PathPolicy {
    pub fn new<I>(roots: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let roots = roots
            .into_iter()
            .map(|root| std::fs::canonicalize(&root).unwrap_or(root))
            .collect();
        Self { roots }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.roots.is_empty()
    }

    /// Whether `path` may be scanned or cleared. `path` must already be in
    /// canonical form for the component-wise prefix check to be meaningful.
    pub fn allows(&self, path: &Path) -> bool {
        self.roots.is_empty() || self.roots.iter().any(|root| path.starts_with(root))
    }
}
