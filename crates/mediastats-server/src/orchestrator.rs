/// Computation orchestration: the cache protocol, per-folder single-flight
/// deduplication, concurrency bounds, and background precompute.
///
/// Each folder moves through `Missing → Computing → Cached → Stale →
/// Computing → ...`; staleness is a fingerprint mismatch (folder mtime in
/// nanoseconds) or an explicit forced refresh. Computations are spawned
/// detached and their outcome distributed over a watch channel, so a caller
/// disconnecting mid-scan never cancels the work for other waiters, and a
/// result is cached even when nobody is left to receive it.
use crate::config::{PathPolicy, ServerConfig};
use crate::error::{ServiceError, StoreError};
use crate::flight::{self, Flight, FlightHandle, FlightMap};
use crate::store::Store;
use chrono::Utc;
use mediastats_core::{
    compute_folder_stats, AnalysisOptions, CacheInfo, FolderStats, StopwordManager,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Analysis cap applied to background jobs unless the batch overrides it.
pub const BACKGROUND_ANALYSIS_LIMIT: usize = 500;

/// One interactive statistics request, resolved from the HTTP body.
#[derive(Debug, Clone)]
pub struct StatsQuery {
    pub folder_path: String,
    pub recursive: bool,
    pub force_refresh: bool,
    pub include_metadata: bool,
    pub analysis_limit: Option<usize>,
}

/// One batch of background precompute submissions.
#[derive(Debug, Clone)]
pub struct PrecomputeBatch {
    pub paths: Vec<String>,
    pub recursive: bool,
    pub analysis_limit: Option<usize>,
    pub force: bool,
}

/// Resolved parameters for one computation.
#[derive(Debug, Clone)]
struct ComputePlan {
    folder: PathBuf,
    key: String,
    options: AnalysisOptions,
    background: bool,
}

type FlightOutcome = Result<FolderStats, ServiceError>;

/// The service behind every endpoint.
///
/// A cheap-to-clone handle, like [`Store`]; clones share one cache, one
/// stopword set, one permit pool, and one in-flight registry.
#[derive(Clone)]
pub struct StatsService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    store: Store,
    stopwords: StopwordManager,
    policy: PathPolicy,
    scan_permits: Semaphore,
    background_permits: Semaphore,
    flights: FlightMap<FlightOutcome>,
}

impl StatsService {
    /// Build the service, loading the persisted stopword list if present.
    pub async fn new(store: Store, config: &ServerConfig) -> Result<Self, StoreError> {
        let stopwords = match store.load_stopwords().await? {
            Some(words) => {
                info!(count = words.len(), "loaded persisted stopword list");
                StopwordManager::with_words(words)
            }
            None => StopwordManager::new(),
        };
        Ok(Self {
            inner: Arc::new(ServiceInner {
                store,
                stopwords,
                policy: PathPolicy::new(config.allowed_roots.iter().cloned()),
                scan_permits: Semaphore::new(config.max_concurrent_scans.max(1)),
                background_permits: Semaphore::new(config.background_workers.max(1)),
                flights: FlightMap::new(),
            }),
        })
    }

    /// Folder statistics per the cache protocol: a fresh cache hit is served
    /// directly; otherwise the caller joins or starts the single in-flight
    /// computation for the path.
    pub async fn folder_stats(&self, query: StatsQuery) -> Result<FolderStats, ServiceError> {
        let folder = self.resolve_folder(&query.folder_path)?;
        let key = folder.to_string_lossy().into_owned();

        if !query.force_refresh {
            if let Some(hit) = self.fresh_cache_hit(&folder, &key).await {
                return Ok(hit);
            }
        }

        let (handle, _started) = self.launch(ComputePlan {
            folder,
            key,
            options: AnalysisOptions {
                recursive: query.recursive,
                include_metadata: query.include_metadata,
                analysis_limit: query.analysis_limit,
            },
            background: false,
        });
        match flight::await_published(handle).await {
            Some(outcome) => outcome,
            None => Err(ServiceError::Computation(
                "computation ended without publishing a result".to_owned(),
            )),
        }
    }

    /// Queue cache-warming computations and return how many actually
    /// started. Paths already in flight or still fresh are skipped unless
    /// `force`; invalid or denied paths are skipped too, never errors.
    pub async fn precompute(&self, batch: PrecomputeBatch) -> usize {
        let limit = batch.analysis_limit.unwrap_or(BACKGROUND_ANALYSIS_LIMIT);
        let mut submitted = 0;
        for raw in &batch.paths {
            let folder = match self.resolve_folder(raw) {
                Ok(folder) => folder,
                Err(err) => {
                    debug!(path = raw, %err, "skipping precompute path");
                    continue;
                }
            };
            let key = folder.to_string_lossy().into_owned();
            if !batch.force && self.is_fresh(&folder, &key).await {
                debug!(folder = %key, "cache still fresh, not queueing");
                continue;
            }
            let (_handle, started) = self.launch(ComputePlan {
                folder,
                key,
                options: AnalysisOptions {
                    recursive: batch.recursive,
                    include_metadata: false,
                    analysis_limit: Some(limit),
                },
                background: true,
            });
            if started {
                submitted += 1;
            }
        }
        if submitted > 0 {
            info!(submitted, requested = batch.paths.len(), "queued precompute jobs");
        }
        submitted
    }

    /// Folder paths with a computation currently pending or running.
    pub fn pending_jobs(&self) -> Vec<String> {
        self.inner.flights.pending()
    }

    /// Remove the cache entries for `paths`; returns how many existed.
    pub async fn clear_cache(&self, paths: &[String]) -> Result<u64, ServiceError> {
        let mut keys = Vec::with_capacity(paths.len());
        for raw in paths {
            keys.push(self.resolve_cache_key(raw)?);
        }
        let cleared = self.inner.store.cache_invalidate(&keys).await?;
        info!(cleared, "cleared cache entries");
        Ok(cleared)
    }

    /// Drop every cache entry; returns how many were removed.
    pub async fn clear_cache_all(&self) -> Result<u64, ServiceError> {
        let cleared = self.inner.store.cache_invalidate_all().await?;
        info!(cleared, "cleared the statistics cache");
        Ok(cleared)
    }

    /// The active stopword list in lexical order.
    pub fn stopword_list(&self) -> Vec<String> {
        self.inner.stopwords.words_sorted()
    }

    /// Replace the stopword list wholesale. Persists before swapping so a
    /// failed write never leaves memory and disk divergent. Returns the new
    /// set's size after normalization.
    pub async fn update_stopwords(&self, words: &[String]) -> Result<usize, ServiceError> {
        self.inner.store.save_stopwords(words).await?;
        let count = self.inner.stopwords.replace(words);
        info!(count, "stopword list replaced");
        Ok(count)
    }

    /// Restore the built-in default list and delete the persisted override.
    pub async fn reset_stopwords(&self) -> Result<usize, ServiceError> {
        self.inner.store.delete_stopwords().await?;
        let count = self.inner.stopwords.reset();
        info!(count, "stopword list reset to built-in default");
        Ok(count)
    }

    /// Join the in-flight computation for the plan's key, or spawn a new
    /// one. Returns the handle plus whether this call started the flight.
    fn launch(&self, plan: ComputePlan) -> (FlightHandle<FlightOutcome>, bool) {
        match self.inner.flights.join_or_lead(&plan.key) {
            Flight::Join(handle) => (handle, false),
            Flight::Lead(tx) => {
                let handle = tx.subscribe();
                let service = self.clone();
                // Detached on purpose: a disconnecting caller must not
                // cancel the computation for other waiters.
                tokio::spawn(async move {
                    let key = plan.key.clone();
                    let outcome = service.compute_and_cache(plan).await;
                    if let Err(err) = &outcome {
                        warn!(folder = %key, %err, "folder statistics computation failed");
                    }
                    service.inner.flights.publish(&key, &tx, outcome);
                });
                (handle, true)
            }
        }
    }

    /// Run the blocking pipeline under the concurrency bounds and write the
    /// result through to the cache. Cache write faults degrade to serving
    /// the result uncached.
    async fn compute_and_cache(&self, plan: ComputePlan) -> FlightOutcome {
        // Background jobs queue behind their own, smaller permit pool so a
        // large precompute batch cannot starve interactive requests.
        let _background_permit = if plan.background {
            Some(self.inner.background_permits.acquire().await.map_err(|_| {
                ServiceError::Computation("background permits closed".to_owned())
            })?)
        } else {
            None
        };
        let _scan_permit = self
            .inner
            .scan_permits
            .acquire()
            .await
            .map_err(|_| ServiceError::Computation("scan permits closed".to_owned()))?;

        // Fingerprint before the scan: a folder mutated mid-scan stores the
        // pre-scan mtime, so the next request sees the entry as stale.
        let fingerprint = folder_fingerprint(&plan.folder)?;
        let index = self
            .inner
            .store
            .index_snapshot(&plan.folder, plan.options.recursive)
            .await
            .map_err(|err| ServiceError::Computation(format!("index snapshot failed: {err}")))?;
        let stopwords = self.inner.stopwords.snapshot();

        let folder = plan.folder.clone();
        let options = plan.options.clone();
        let computed = tokio::task::spawn_blocking(move || {
            compute_folder_stats(&folder, &index, &stopwords, &options)
        })
        .await
        .map_err(|err| ServiceError::Computation(format!("computation task failed: {err}")))?;

        let mut stats = computed.map_err(ServiceError::from)?;
        let computed_at = Utc::now();
        stats.cache_info = CacheInfo {
            is_cached: false,
            computed_at: Some(computed_at),
            cache_valid: false,
        };

        if let Err(err) = self
            .inner
            .store
            .cache_put(&plan.key, fingerprint, &stats, computed_at)
            .await
        {
            warn!(folder = %plan.key, %err, "cache write failed, serving uncached result");
        }
        Ok(stats)
    }

    /// The cached entry for `key` if its fingerprint still matches the
    /// folder, with provenance reattached. Store faults degrade to a miss.
    async fn fresh_cache_hit(&self, folder: &Path, key: &str) -> Option<FolderStats> {
        let current = folder_fingerprint(folder).ok()?;
        let entry = match self.inner.store.cache_get(key).await {
            Ok(entry) => entry?,
            Err(err) => {
                warn!(folder = %key, %err, "cache read failed, treating as miss");
                return None;
            }
        };
        if entry.modified_time != current {
            debug!(folder = %key, "cache entry is stale");
            return None;
        }
        debug!(folder = %key, "cache hit");
        let mut stats = entry.stats;
        stats.cache_info = CacheInfo {
            is_cached: true,
            computed_at: Some(entry.computed_at),
            cache_valid: true,
        };
        Some(stats)
    }

    /// Freshness check without decoding the blob, for precompute skips.
    async fn is_fresh(&self, folder: &Path, key: &str) -> bool {
        let Ok(current) = folder_fingerprint(folder) else {
            return false;
        };
        match self.inner.store.cache_fingerprint(key).await {
            Ok(Some(stored)) => stored == current,
            Ok(None) => false,
            Err(err) => {
                warn!(folder = %key, %err, "cache freshness check failed, assuming stale");
                false
            }
        }
    }

    /// Canonicalize and authorize a folder path for computation. The
    /// canonical form serves as cache key, scan root, and index snapshot
    /// prefix, so all three always agree.
    fn resolve_folder(&self, raw: &str) -> Result<PathBuf, ServiceError> {
        if raw.trim().is_empty() {
            return Err(ServiceError::InvalidPath(raw.to_owned()));
        }
        let folder = std::fs::canonicalize(raw)
            .map_err(|_| ServiceError::InvalidPath(raw.to_owned()))?;
        if !self.inner.policy.allows(&folder) {
            return Err(ServiceError::AccessDenied(raw.to_owned()));
        }
        Ok(folder)
    }

    /// Authorize a path for cache invalidation. The folder may already be
    /// gone (often the reason it is being cleared), so canonicalization
    /// failure falls back to the literal path.
    fn resolve_cache_key(&self, raw: &str) -> Result<String, ServiceError> {
        let folder = std::fs::canonicalize(raw).unwrap_or_else(|_| PathBuf::from(raw));
        if !self.inner.policy.allows(&folder) {
            return Err(ServiceError::AccessDenied(raw.to_owned()));
        }
        Ok(folder.to_string_lossy().into_owned())
    }
}

/// The folder's modification time in whole nanoseconds since the Unix
/// epoch, so fingerprint equality is exact.
fn folder_fingerprint(folder: &Path) -> Result<i64, ServiceError> {
    let metadata = std::fs::metadata(folder)
        .map_err(|_| ServiceError::InvalidPath(folder.display().to_string()))?;
    if !metadata.is_dir() {
        return Err(ServiceError::InvalidPath(folder.display().to_string()));
    }
    let modified = metadata
        .modified()
        .map_err(|err| ServiceError::Computation(format!("folder mtime unavailable: {err}")))?;
    Ok(system_time_nanos(modified))
}

fn system_time_nanos(at: SystemTime) -> i64 {
    match at.duration_since(UNIX_EPOCH) {
        Ok(since) => since.as_nanos() as i64,
        // Pre-epoch mtimes exist on some filesystems.
        Err(err) => -(err.duration().as_nanos() as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn fingerprint_requires_a_directory() {
        let dir = TempDir::new().unwrap();
        assert!(folder_fingerprint(dir.path()).is_ok());

        let file = dir.path().join("plain.txt");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(
            folder_fingerprint(&file),
            Err(ServiceError::InvalidPath(_))
        ));
        assert!(matches!(
            folder_fingerprint(Path::new("/no/such/folder")),
            Err(ServiceError::InvalidPath(_))
        ));
    }

    #[test]
    fn system_time_nanos_is_signed_around_the_epoch() {
        assert_eq!(system_time_nanos(UNIX_EPOCH), 0);
        assert_eq!(
            system_time_nanos(UNIX_EPOCH + Duration::from_nanos(1_500)),
            1_500
        );
        assert_eq!(
            system_time_nanos(UNIX_EPOCH - Duration::from_nanos(2_000)),
            -2_000
        );
    }

    #[tokio::test]
    async fn resolve_folder_enforces_policy_and_existence() {
        let allowed = TempDir::new().unwrap();
        let denied = TempDir::new().unwrap();

        let store = Store::open_in_memory().await.unwrap();
        let config = ServerConfig {
            allowed_roots: vec![allowed.path().to_path_buf()],
            ..ServerConfig::default()
        };
        let service = StatsService::new(store, &config).await.unwrap();

        assert!(service
            .resolve_folder(&allowed.path().to_string_lossy())
            .is_ok());
        assert!(matches!(
            service.resolve_folder(&denied.path().to_string_lossy()),
            Err(ServiceError::AccessDenied(_))
        ));
        assert!(matches!(
            service.resolve_folder("/no/such/folder"),
            Err(ServiceError::InvalidPath(_))
        ));
        assert!(matches!(
            service.resolve_folder("  "),
            Err(ServiceError::InvalidPath(_))
        ));
    }

    /// Clearing accepts paths that no longer exist, but the policy still
    /// applies to them.
    #[tokio::test]
    async fn resolve_cache_key_tolerates_missing_paths() {
        let allowed = TempDir::new().unwrap();
        let root = allowed.path().canonicalize().unwrap();

        let store = Store::open_in_memory().await.unwrap();
        let config = ServerConfig {
            allowed_roots: vec![root.clone()],
            ..ServerConfig::default()
        };
        let service = StatsService::new(store, &config).await.unwrap();

        let gone = root.join("deleted-album");
        let key = service
            .resolve_cache_key(&gone.to_string_lossy())
            .unwrap();
        assert_eq!(key, gone.to_string_lossy());

        assert!(matches!(
            service.resolve_cache_key("/outside/of/roots"),
            Err(ServiceError::AccessDenied(_))
        ));
    }
}
