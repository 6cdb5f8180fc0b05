/// SQLite-backed persistence: the statistics cache, service settings, and
/// the media-index adapter.
///
/// One pool serves all three concerns. The cache and settings tables are
/// owned by this service; the media-index tables (`image`, `tag`,
/// `image_tag`) belong to the wider application and are only read here.
/// Their migration statements are IF NOT EXISTS so attaching to an
/// already-populated database is non-destructive.
mod cache;
mod index;
mod settings;

pub use cache::CachedStats;
pub use settings::STOPWORDS_KEY;

use crate::error::StoreError;
use sqlx::pool::PoolConnectionMetadata;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::SqliteConnection;
use std::path::Path;
use std::time::Duration;

/// Embedded migrations, run automatically on open.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

const MAX_CONNECTIONS: u32 = 5;

/// Connection pool handle. Cheap to clone; all store operations hang off it.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    async fn new(options: SqliteConnectOptions, max: Option<u32>) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            // Applied to every pooled connection, not just the first.
            .after_connect(|conn, meta| {
                Box::pin(async move { Self::apply_pragmas(conn, meta).await })
            })
            .max_connections(max.unwrap_or(MAX_CONNECTIONS))
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Open the database at `path`, creating it if missing, and migrate.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let options = Self::base_options()
            .filename(path.as_ref())
            .create_if_missing(true);
        Self::new(options, None).await
    }

    /// In-memory database for tests. Limited to one connection so every
    /// query sees the same database.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let options = Self::base_options().filename(":memory:");
        Self::new(options, Some(1)).await
    }

    fn base_options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .synchronous(SqliteSynchronous::Normal)
            // Scans write cache rows while background jobs read; a short
            // busy wait absorbs the single-writer handoff in WAL mode.
            .busy_timeout(Duration::from_millis(1500))
    }

    async fn apply_pragmas(
        conn: &mut SqliteConnection,
        _meta: PoolConnectionMetadata,
    ) -> sqlx::Result<()> {
        sqlx::query(
            r#"
                PRAGMA temp_store = MEMORY;
                PRAGMA cache_size = -8192;
            "#,
        )
        .execute(conn)
        .await?;
        Ok(())
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    /// The underlying pool, for custom queries (tests seed index rows
    /// through this).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
