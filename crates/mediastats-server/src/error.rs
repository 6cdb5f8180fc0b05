/// Server-side error types.
///
/// `StoreError` covers database and blob-codec faults inside the store;
/// `ServiceError` is what the orchestrator surfaces to the HTTP layer. Both
/// stay deliberately small: per-file faults never reach here (the engine
/// skips them), and cache read/write faults degrade to misses instead of
/// erroring.
use mediastats_core::StatsError;
use thiserror::Error;

/// Faults inside the SQLite store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A blob or setting value failed to encode or decode.
    #[error("stored value not serializable: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Faults surfaced to callers of the statistics service.
///
/// Cloneable because a single in-flight computation distributes its outcome
/// to every waiter over a watch channel.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// The path is malformed, does not exist, or is not a directory.
    #[error("invalid folder path: {0}")]
    InvalidPath(String),

    /// The path falls outside the configured allowed roots.
    #[error("path is outside the allowed roots: {0}")]
    AccessDenied(String),

    /// The computation failed in a way no per-file skip could absorb.
    #[error("statistics computation failed: {0}")]
    Computation(String),
}

impl From<StatsError> for ServiceError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::InvalidPath(path) => Self::InvalidPath(path.display().to_string()),
            unreadable @ StatsError::FolderUnreadable { .. } => {
                Self::Computation(unreadable.to_string())
            }
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        Self::Computation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn engine_invalid_path_stays_invalid_path() {
        let err = ServiceError::from(StatsError::InvalidPath(PathBuf::from("/nope")));
        assert!(matches!(err, ServiceError::InvalidPath(_)));
        assert!(err.to_string().contains("/nope"));
    }

    #[test]
    fn engine_unreadable_folder_becomes_computation_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ServiceError::from(StatsError::FolderUnreadable {
            path: PathBuf::from("/locked"),
            source: io,
        });
        assert!(matches!(err, ServiceError::Computation(_)));
        assert!(err.to_string().contains("/locked"));
    }
}
