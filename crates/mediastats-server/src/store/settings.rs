/// Persisted service settings: keyed rows in `global_settings`.
use super::Store;
use crate::error::StoreError;
use tracing::warn;

/// Settings key holding the persisted stopword list, a JSON string array.
pub const STOPWORDS_KEY: &str = "folder_stats_stopwords";

impl Store {
    /// The persisted stopword list, or `None` when unset. A value that is
    /// not a JSON string array degrades to `None` so the built-in default
    /// applies.
    pub async fn load_stopwords(&self) -> Result<Option<Vec<String>>, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM global_settings WHERE key = ?")
                .bind(STOPWORDS_KEY)
                .fetch_optional(&self.pool)
                .await?;
        let Some((value,)) = row else {
            return Ok(None);
        };
        match serde_json::from_str::<Vec<String>>(&value) {
            Ok(words) => Ok(Some(words)),
            Err(err) => {
                warn!(%err, "ignoring undecodable stored stopword list");
                Ok(None)
            }
        }
    }

    /// Persist `words` as the active stopword list.
    pub async fn save_stopwords(&self, words: &[String]) -> Result<(), StoreError> {
        let value = serde_json::to_string(words)?;
        sqlx::query("INSERT OR REPLACE INTO global_settings (key, value) VALUES (?, ?)")
            .bind(STOPWORDS_KEY)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove the persisted list so the built-in default (including future
    /// revisions of it) applies again.
    pub async fn delete_stopwords(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM global_settings WHERE key = ?")
            .bind(STOPWORDS_KEY)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
