/// MediaStats Server — caching, orchestration, and the HTTP API.
///
/// Wraps the pure analysis engine in `mediastats-core` with everything a
/// long-running service needs: a SQLite-backed statistics cache, per-folder
/// single-flight computation, bounded scan concurrency, background
/// precompute, stopword persistence, and an axum route surface.
///
/// # Modules
///
/// - [`api`] — Router, request/response models, auth middleware, error mapping.
/// - [`config`] — Server configuration and the allowed-roots path policy.
/// - [`error`] — Store and service error types.
/// - [`orchestrator`] — Cache protocol, single-flight, background jobs.
/// - [`store`] — SQLite pool, migrations, cache/settings/index queries.
pub mod api;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod store;

mod flight;

pub use api::{router, ApiError, AppState};
pub use config::{PathPolicy, ServerConfig};
pub use error::{ServiceError, StoreError};
pub use orchestrator::{PrecomputeBatch, StatsQuery, StatsService, BACKGROUND_ANALYSIS_LIMIT};
pub use store::Store;
