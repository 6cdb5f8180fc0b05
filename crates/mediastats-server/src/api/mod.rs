/// HTTP surface: router assembly, request/response models, bearer-token
/// authentication, and the error-to-status mapping.
mod error;
mod middleware;
mod routes;

pub use error::ApiError;
pub use routes::router;

use crate::orchestrator::StatsService;

/// Shared state handed to every handler and the auth middleware.
#[derive(Clone)]
pub struct AppState {
    pub service: StatsService,
    pub api_token: Option<String>,
    pub read_only: bool,
}
