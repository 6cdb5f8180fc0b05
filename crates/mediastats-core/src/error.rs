/// Engine error type.
///
/// Per-entry faults during a scan (unreadable file, broken symlink, corrupt
/// metadata) are never errors; they are skipped and counted. `StatsError`
/// covers only faults that invalidate the whole computation.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    /// The requested folder does not exist or is not a directory.
    #[error("invalid folder path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// The folder itself could not be read (as opposed to one entry in it).
    #[error("failed to read folder {}: {source}", .path.display())]
    FolderUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
