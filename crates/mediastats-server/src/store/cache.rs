/// The folder-statistics cache table: a dumb keyed store.
///
/// Freshness comparison is the orchestrator's job; this module only moves
/// rows. Blobs are stored without cache provenance (`cache_info` stays at
/// its default), which the orchestrator reattaches when serving a hit.
use super::Store;
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use mediastats_core::{CacheInfo, FolderStats};
use tracing::warn;

/// One decoded cache row.
#[derive(Debug, Clone)]
pub struct CachedStats {
    /// Folder mtime fingerprint at computation time, nanoseconds since the
    /// Unix epoch.
    pub modified_time: i64,
    pub stats: FolderStats,
    pub computed_at: DateTime<Utc>,
}

/// Nanoseconds since the Unix epoch; saturates at the representable
/// maximum (year 2262).
pub(crate) fn datetime_to_nanos(at: DateTime<Utc>) -> i64 {
    at.timestamp_nanos_opt().unwrap_or(i64::MAX)
}

pub(crate) fn nanos_to_datetime(nanos: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_nanos(nanos)
}

impl Store {
    /// The entry for `folder_path`, or `None`. A corrupt blob degrades to a
    /// miss so one bad row can never wedge a folder.
    pub async fn cache_get(&self, folder_path: &str) -> Result<Option<CachedStats>, StoreError> {
        let row: Option<(i64, String, i64)> = sqlx::query_as(
            "SELECT modified_time, stats, computed_at \
             FROM folder_stats_cache WHERE folder_path = ?",
        )
        .bind(folder_path)
        .fetch_optional(&self.pool)
        .await?;

        let Some((modified_time, blob, computed_at)) = row else {
            return Ok(None);
        };
        match serde_json::from_str::<FolderStats>(&blob) {
            Ok(stats) => Ok(Some(CachedStats {
                modified_time,
                stats,
                computed_at: nanos_to_datetime(computed_at),
            })),
            Err(err) => {
                warn!(folder = folder_path, %err, "discarding undecodable cache row");
                Ok(None)
            }
        }
    }

    /// Just the stored fingerprint for `folder_path`, for freshness checks
    /// that do not need the blob.
    pub async fn cache_fingerprint(&self, folder_path: &str) -> Result<Option<i64>, StoreError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT modified_time FROM folder_stats_cache WHERE folder_path = ?")
                .bind(folder_path)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(modified_time,)| modified_time))
    }

    /// Insert or overwrite the entry for `folder_path`.
    pub async fn cache_put(
        &self,
        folder_path: &str,
        modified_time: i64,
        stats: &FolderStats,
        computed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let blob = FolderStats {
            cache_info: CacheInfo::default(),
            ..stats.clone()
        };
        let encoded = serde_json::to_string(&blob)?;
        sqlx::query(
            "INSERT OR REPLACE INTO folder_stats_cache \
             (folder_path, modified_time, stats, computed_at) VALUES (?, ?, ?, ?)",
        )
        .bind(folder_path)
        .bind(modified_time)
        .bind(encoded)
        .bind(datetime_to_nanos(computed_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Remove the entries for `paths`. Returns how many rows existed.
    pub async fn cache_invalidate(&self, paths: &[String]) -> Result<u64, StoreError> {
        let mut cleared = 0;
        for path in paths {
            let result = sqlx::query("DELETE FROM folder_stats_cache WHERE folder_path = ?")
                .bind(path)
                .execute(&self.pool)
                .await?;
            cleared += result.rows_affected();
        }
        Ok(cleared)
    }

    /// Drop every cache row. Returns how many were removed.
    pub async fn cache_invalidate_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM folder_stats_cache")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
