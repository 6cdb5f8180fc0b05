/// The error-to-response mapping for the HTTP surface.
use crate::error::ServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors a handler can surface to a client.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Missing or wrong bearer token.
    Unauthenticated,
    /// Writes rejected while the server runs read-only.
    ReadOnly,
    /// A service failure with its own status mapping.
    Service(ServiceError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::ReadOnly => StatusCode::FORBIDDEN,
            ApiError::Service(ServiceError::InvalidPath(_)) => StatusCode::BAD_REQUEST,
            ApiError::Service(ServiceError::AccessDenied(_)) => StatusCode::FORBIDDEN,
            ApiError::Service(ServiceError::Computation(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code, independent of the message text.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated => "unauthenticated",
            ApiError::ReadOnly => "access_denied",
            ApiError::Service(ServiceError::InvalidPath(_)) => "invalid_path",
            ApiError::Service(ServiceError::AccessDenied(_)) => "access_denied",
            ApiError::Service(ServiceError::Computation(_)) => "computation_failure",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthenticated => write!(f, "missing or invalid API token"),
            ApiError::ReadOnly => write!(f, "server is running in read-only mode"),
            ApiError::Service(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

/// Wire shape of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.error_code().to_owned(),
            message: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_code_follow_the_variant() {
        let cases = [
            (ApiError::Unauthenticated, StatusCode::UNAUTHORIZED, "unauthenticated"),
            (ApiError::ReadOnly, StatusCode::FORBIDDEN, "access_denied"),
            (
                ApiError::Service(ServiceError::InvalidPath("x".into())),
                StatusCode::BAD_REQUEST,
                "invalid_path",
            ),
            (
                ApiError::Service(ServiceError::AccessDenied("x".into())),
                StatusCode::FORBIDDEN,
                "access_denied",
            ),
            (
                ApiError::Service(ServiceError::Computation("x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
                "computation_failure",
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_code(), status);
            assert_eq!(err.error_code(), code);
        }
    }
}
