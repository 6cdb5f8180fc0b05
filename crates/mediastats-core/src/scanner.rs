/// Parallel folder traversal using `jwalk`.
///
/// One call walks one folder tree and returns totals plus the media files
/// found, in deterministic name-sorted order. Individual unreadable entries
/// are skipped and counted, never fatal; only a root that cannot be walked
/// at all fails the scan.
use crate::error::StatsError;
use crate::media::{self, MediaKind};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// One media file discovered by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    pub size: u64,
    pub kind: MediaKind,
}

/// Raw totals from walking one folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Files of any type, media or not.
    pub file_count: u64,
    /// Directories below the root (the root itself is not counted).
    pub subfolder_count: u64,
    pub total_size_bytes: u64,
    /// Entries dropped because they could not be read or statted.
    pub skipped_entries: u64,
    /// Media files in walk order: depth first, siblings name-sorted.
    pub media_files: Vec<MediaFile>,
}

impl ScanOutcome {
    pub fn media_file_count(&self) -> u64 {
        self.media_files.len() as u64
    }
}

/// Directory identity for cycle detection: (device, inode) on Unix.
///
/// With `follow_links(false)` symlinks are never descended, so this guards
/// against the remaining loop sources (bind mounts and similar).
#[cfg(unix)]
fn dir_identity(path: &Path) -> Option<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    std::fs::metadata(path).ok().map(|meta| (meta.dev(), meta.ino()))
}

#[cfg(not(unix))]
fn dir_identity(_path: &Path) -> Option<(u64, u64)> {
    None
}

/// Walk `root` and collect totals and media files.
///
/// `recursive = false` looks at direct children only. Termination is
/// guaranteed: symlinks are not followed, and any directory whose identity
/// was already visited is not descended again.
pub fn scan_folder(root: &Path, recursive: bool) -> Result<ScanOutcome, StatsError> {
    let root_meta = match std::fs::metadata(root) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(StatsError::InvalidPath(root.to_path_buf()));
        }
        Err(err) => {
            return Err(StatsError::FolderUnreadable {
                path: root.to_path_buf(),
                source: err,
            });
        }
    };
    if !root_meta.is_dir() {
        return Err(StatsError::InvalidPath(root.to_path_buf()));
    }

    let start = Instant::now();

    let visited: Arc<Mutex<HashSet<(u64, u64)>>> = Arc::new(Mutex::new(HashSet::new()));
    if let Some(id) = dir_identity(root) {
        visited.lock().insert(id);
    }

    let mut walker = jwalk::WalkDir::new(root)
        .skip_hidden(false)
        .follow_links(false)
        .sort(true)
        .parallelism(jwalk::Parallelism::RayonNewPool(num_cpus::get()));
    if !recursive {
        walker = walker.max_depth(1);
    }

    // Drop directories whose identity was seen before they are descended.
    let guard = Arc::clone(&visited);
    let walker = walker.process_read_dir(move |_depth, dir_path, _state, children| {
        for child in children.iter_mut().flatten() {
            if child.file_type.is_dir() {
                let child_path = dir_path.join(&child.file_name);
                if let Some(id) = dir_identity(&child_path) {
                    if !guard.lock().insert(id) {
                        child.read_children_path = None;
                    }
                }
            }
        }
    });

    let mut outcome = ScanOutcome::default();

    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                // jwalk errors are typically access-denied on directory reads.
                outcome.skipped_entries += 1;
                debug!(error = %err, "skipping unreadable entry");
                continue;
            }
        };

        // The root itself is yielded at depth 0 and counts as neither a
        // subfolder nor a file.
        if entry.depth == 0 {
            continue;
        }

        if entry.file_type().is_dir() {
            outcome.subfolder_count += 1;
            continue;
        }

        let path = entry.path();
        let size = match std::fs::symlink_metadata(&path) {
            Ok(meta) => meta.len(),
            Err(err) => {
                outcome.skipped_entries += 1;
                debug!(path = %path.display(), error = %err, "skipping unstattable file");
                continue;
            }
        };

        outcome.file_count += 1;
        outcome.total_size_bytes += size;

        if let Some(kind) = media::classify_path(&path) {
            outcome.media_files.push(MediaFile { path, size, kind });
        }
    }

    debug!(
        root = %root.display(),
        recursive,
        files = outcome.file_count,
        subfolders = outcome.subfolder_count,
        media = outcome.media_files.len(),
        skipped = outcome.skipped_entries,
        elapsed = ?start.elapsed(),
        "scan complete"
    );

    Ok(outcome)
}
