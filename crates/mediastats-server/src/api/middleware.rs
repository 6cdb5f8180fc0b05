/// Bearer-token authentication middleware.
use super::error::ApiError;
use super::AppState;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

/// Reject requests whose `Authorization: Bearer <token>` header does not
/// match the configured token. A server without a configured token accepts
/// every request.
pub async fn require_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = &state.api_token {
        let presented = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));
        match presented {
            Some(token) if token == expected => {}
            _ => return Err(ApiError::Unauthenticated),
        }
    }
    Ok(next.run(req).await)
}
