/// Route table, request/response models, and handlers.
use super::error::ApiError;
use super::middleware::require_auth;
use super::AppState;
use crate::orchestrator::{PrecomputeBatch, StatsQuery};
use axum::{
    extract::State,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use mediastats_core::{FolderStats, DEFAULT_STOPWORDS};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

/// Assemble the application router. Everything except `/health` sits behind
/// the bearer-token middleware.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/folder_stats", post(folder_stats))
        .route("/folder_stats/refresh", post(folder_stats_refresh))
        .route("/folder_stats/cache", delete(clear_cache))
        .route("/folder_stats/cache/all", delete(clear_cache_all))
        .route(
            "/folder_stats/stopwords",
            get(get_stopwords).post(update_stopwords),
        )
        .route("/folder_stats/stopwords/reset", post(reset_stopwords))
        .route("/folder_stats/precompute", post(precompute))
        .route("/folder_stats/jobs", get(jobs))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(protected)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─── Request models ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatsRequest {
    pub folder_path: String,
    #[serde(default = "default_true")]
    pub recursive: bool,
    #[serde(default)]
    pub force_refresh: bool,
    #[serde(default = "default_true")]
    pub include_metadata: bool,
    #[serde(default)]
    pub analysis_limit: Option<usize>,
}

impl StatsRequest {
    fn into_query(self, force: bool) -> StatsQuery {
        StatsQuery {
            folder_path: self.folder_path,
            recursive: self.recursive,
            force_refresh: self.force_refresh || force,
            include_metadata: self.include_metadata,
            analysis_limit: self.analysis_limit,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ClearCacheRequest {
    pub paths: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct StopwordsUpdateRequest {
    pub words: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PrecomputeRequest {
    pub paths: Vec<String>,
    #[serde(default = "default_true")]
    pub recursive: bool,
    #[serde(default)]
    pub analysis_limit: Option<usize>,
    #[serde(default)]
    pub force: bool,
}

fn default_true() -> bool {
    true
}

// ─── Response models ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ClearedResponse {
    pub cleared: u64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StopwordsResponse {
    pub stopwords: Vec<String>,
    pub count: usize,
    pub default_count: usize,
}

#[derive(Debug, Serialize)]
pub struct StopwordsChangedResponse {
    pub message: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct PrecomputeResponse {
    pub submitted: usize,
}

#[derive(Debug, Serialize)]
pub struct JobsResponse {
    pub pending: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// POST /folder_stats: statistics for one folder, served from cache when the
/// folder is unchanged since the entry was computed.
async fn folder_stats(
    State(state): State<AppState>,
    Json(req): Json<StatsRequest>,
) -> Result<Json<FolderStats>, ApiError> {
    let stats = state.service.folder_stats(req.into_query(false)).await?;
    Ok(Json(stats))
}

/// POST /folder_stats/refresh: recompute unconditionally, bypassing the cache.
async fn folder_stats_refresh(
    State(state): State<AppState>,
    Json(req): Json<StatsRequest>,
) -> Result<Json<FolderStats>, ApiError> {
    let stats = state.service.folder_stats(req.into_query(true)).await?;
    Ok(Json(stats))
}

/// DELETE /folder_stats/cache: drop the cache entries for the given paths.
async fn clear_cache(
    State(state): State<AppState>,
    Json(req): Json<ClearCacheRequest>,
) -> Result<Json<ClearedResponse>, ApiError> {
    ensure_writable(&state)?;
    let cleared = state.service.clear_cache(&req.paths).await?;
    Ok(Json(ClearedResponse { cleared }))
}

/// DELETE /folder_stats/cache/all: drop every cache entry.
async fn clear_cache_all(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    ensure_writable(&state)?;
    let cleared = state.service.clear_cache_all().await?;
    Ok(Json(MessageResponse {
        message: format!("cleared {cleared} cached folder statistics"),
    }))
}

/// GET /folder_stats/stopwords: the active list, sorted ascending.
async fn get_stopwords(State(state): State<AppState>) -> Json<StopwordsResponse> {
    let stopwords = state.service.stopword_list();
    let count = stopwords.len();
    Json(StopwordsResponse {
        stopwords,
        count,
        default_count: DEFAULT_STOPWORDS.len(),
    })
}

/// POST /folder_stats/stopwords: replace the list wholesale and persist it.
async fn update_stopwords(
    State(state): State<AppState>,
    Json(req): Json<StopwordsUpdateRequest>,
) -> Result<Json<StopwordsChangedResponse>, ApiError> {
    ensure_writable(&state)?;
    let count = state.service.update_stopwords(&req.words).await?;
    Ok(Json(StopwordsChangedResponse {
        message: "stopword list updated".to_owned(),
        count,
    }))
}

/// POST /folder_stats/stopwords/reset: restore the built-in default list.
async fn reset_stopwords(
    State(state): State<AppState>,
) -> Result<Json<StopwordsChangedResponse>, ApiError> {
    ensure_writable(&state)?;
    let count = state.service.reset_stopwords().await?;
    Ok(Json(StopwordsChangedResponse {
        message: "stopword list reset to defaults".to_owned(),
        count,
    }))
}

/// POST /folder_stats/precompute: queue background cache warming for a batch
/// of folders; responds immediately with how many jobs were actually queued.
async fn precompute(
    State(state): State<AppState>,
    Json(req): Json<PrecomputeRequest>,
) -> Result<Json<PrecomputeResponse>, ApiError> {
    ensure_writable(&state)?;
    let submitted = state
        .service
        .precompute(PrecomputeBatch {
            paths: req.paths,
            recursive: req.recursive,
            analysis_limit: req.analysis_limit,
            force: req.force,
        })
        .await;
    Ok(Json(PrecomputeResponse { submitted }))
}

/// GET /folder_stats/jobs: folder paths with a computation in flight.
async fn jobs(State(state): State<AppState>) -> Json<JobsResponse> {
    let pending = state.service.pending_jobs();
    let count = pending.len();
    Json(JobsResponse { pending, count })
}

/// GET /health: liveness probe, reachable without a token.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn ensure_writable(state: &AppState) -> Result<(), ApiError> {
    if state.read_only {
        return Err(ApiError::ReadOnly);
    }
    Ok(())
}
