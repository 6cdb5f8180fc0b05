/// Read-side adapter for the wider application's media-index schema.
///
/// The pipeline's index lookups are synchronous hash probes, so the adapter
/// materializes the folder's slice of the `image`/`tag`/`image_tag` tables
/// into a `MemoryIndex` snapshot up front; the blocking computation then
/// never touches the database.
use super::Store;
use crate::error::StoreError;
use mediastats_core::{IndexRecord, MemoryIndex, TagRef};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

impl Store {
    /// Materialize the index records for media files under `folder`.
    ///
    /// `folder` must be the canonical path the scanner will walk so that
    /// row paths and scanned paths compare equal. Non-recursive snapshots
    /// keep only direct children.
    pub async fn index_snapshot(
        &self,
        folder: &Path,
        recursive: bool,
    ) -> Result<MemoryIndex, StoreError> {
        let prefix = like_prefix(folder);

        let files: Vec<(String, Option<String>)> =
            sqlx::query_as("SELECT path, exif FROM image WHERE path LIKE ?")
                .bind(&prefix)
                .fetch_all(&self.pool)
                .await?;

        let mut records: HashMap<PathBuf, IndexRecord> = HashMap::with_capacity(files.len());
        for (path, exif) in files {
            let path = PathBuf::from(path);
            if !recursive && path.parent() != Some(folder) {
                continue;
            }
            records.insert(
                path,
                IndexRecord {
                    tags: Vec::new(),
                    generation_metadata: exif,
                },
            );
        }

        // Tag ids ascend within each file so aggregation input is stable.
        let tags: Vec<(String, i64, String, String, Option<String>)> = sqlx::query_as(
            "SELECT image.path, tag.id, tag.name, tag.type, tag.display_name \
             FROM image_tag \
             JOIN image ON image.id = image_tag.image_id \
             JOIN tag ON tag.id = image_tag.tag_id \
             WHERE image.path LIKE ? \
             ORDER BY image.id, tag.id",
        )
        .bind(&prefix)
        .fetch_all(&self.pool)
        .await?;

        for (path, id, name, tag_type, display_name) in tags {
            if let Some(record) = records.get_mut(Path::new(&path)) {
                record.tags.push(TagRef {
                    id,
                    name: name.into(),
                    tag_type: tag_type.into(),
                    display_name: display_name.map(Into::into),
                });
            }
        }

        let total = records.len();
        let mut snapshot = MemoryIndex::new();
        for (path, record) in records {
            snapshot.insert(path, record);
        }
        debug!(
            folder = %folder.display(),
            records = total,
            recursive,
            "materialized media-index snapshot"
        );
        Ok(snapshot)
    }
}

/// SQL LIKE prefix matching everything strictly under `folder`.
fn like_prefix(folder: &Path) -> String {
    let base = folder.to_string_lossy();
    let base = base.trim_end_matches(std::path::MAIN_SEPARATOR);
    format!("{base}{}%", std::path::MAIN_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediastats_core::MediaIndex;

    async fn seed_image(store: &Store, path: &str, exif: Option<&str>) {
        sqlx::query("INSERT INTO image (path, exif) VALUES (?, ?)")
            .bind(path)
            .bind(exif)
            .execute(store.pool())
            .await
            .unwrap();
    }

    async fn seed_tag(store: &Store, id: i64, name: &str) {
        sqlx::query("INSERT OR IGNORE INTO tag (id, name, type) VALUES (?, ?, 'custom')")
            .bind(id)
            .bind(name)
            .execute(store.pool())
            .await
            .unwrap();
    }

    async fn link(store: &Store, path: &str, tag_id: i64) {
        sqlx::query("INSERT INTO image_tag (image_id, tag_id) SELECT id, ? FROM image WHERE path = ?")
            .bind(tag_id)
            .bind(path)
            .execute(store.pool())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn snapshot_scopes_to_folder_prefix() {
        let store = Store::open_in_memory().await.unwrap();
        seed_image(&store, "/gallery/a.png", Some("prompt a")).await;
        seed_image(&store, "/gallery/sub/b.png", None).await;
        seed_image(&store, "/elsewhere/c.png", Some("prompt c")).await;

        let snapshot = store
            .index_snapshot(Path::new("/gallery"), true)
            .await
            .unwrap();

        assert_eq!(snapshot.len(), 2);
        let record = snapshot.lookup(Path::new("/gallery/a.png")).unwrap();
        assert_eq!(record.generation_metadata.as_deref(), Some("prompt a"));
        assert!(snapshot.lookup(Path::new("/elsewhere/c.png")).is_none());
    }

    #[tokio::test]
    async fn non_recursive_snapshot_keeps_direct_children_only() {
        let store = Store::open_in_memory().await.unwrap();
        seed_image(&store, "/gallery/a.png", None).await;
        seed_image(&store, "/gallery/sub/b.png", None).await;

        let snapshot = store
            .index_snapshot(Path::new("/gallery"), false)
            .await
            .unwrap();

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.lookup(Path::new("/gallery/a.png")).is_some());
        assert!(snapshot.lookup(Path::new("/gallery/sub/b.png")).is_none());
    }

    #[tokio::test]
    async fn tags_attach_in_ascending_id_order() {
        let store = Store::open_in_memory().await.unwrap();
        seed_image(&store, "/gallery/a.png", None).await;
        seed_tag(&store, 9, "portrait").await;
        seed_tag(&store, 5, "landscape").await;
        link(&store, "/gallery/a.png", 9).await;
        link(&store, "/gallery/a.png", 5).await;

        let snapshot = store
            .index_snapshot(Path::new("/gallery"), true)
            .await
            .unwrap();

        let record = snapshot.lookup(Path::new("/gallery/a.png")).unwrap();
        let ids: Vec<i64> = record.tags.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![5, 9]);
        assert_eq!(record.tags[0].name, "landscape");
        assert_eq!(record.tags[0].tag_type, "custom");
    }

    /// A folder prefix must not match sibling folders sharing the prefix
    /// string ("/gallery" vs "/gallery2").
    #[tokio::test]
    async fn prefix_does_not_leak_into_sibling_folders() {
        let store = Store::open_in_memory().await.unwrap();
        seed_image(&store, "/gallery2/z.png", None).await;

        let snapshot = store
            .index_snapshot(Path::new("/gallery"), true)
            .await
            .unwrap();
        assert!(snapshot.is_empty());
    }
}
