/// Media classification based on file extensions.
///
/// A file is media when its extension names a known still-image or video
/// format. Matching is case-insensitive and everything else is non-media.
use std::path::Path;

/// The two media populations tracked separately in statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
}

/// Classify a file extension as image, video, or neither.
///
/// Zero-heap-allocation hot path: extensions are lowercased into a fixed-size
/// stack buffer (`[u8; 16]`) rather than allocating a `String`. Extensions
/// longer than 16 bytes are never media.
pub fn classify_extension(ext: &str) -> Option<MediaKind> {
    let bytes = ext.as_bytes();
    if bytes.len() > 16 {
        return None;
    }

    let mut lower = [0u8; 16];
    for (dest, &src) in lower.iter_mut().zip(bytes.iter()) {
        *dest = src.to_ascii_lowercase();
    }
    let lower_str = match std::str::from_utf8(&lower[..bytes.len()]) {
        Ok(s) => s,
        Err(_) => return None,
    };

    match lower_str {
        "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp" | "avif" | "tiff" | "tif" | "ico"
        | "heic" | "heif" => Some(MediaKind::Image),
        "mp4" | "webm" | "mov" | "avi" | "mkv" | "flv" | "wmv" | "m4v" | "mpg" | "mpeg"
        | "ts" => Some(MediaKind::Video),
        _ => None,
    }
}

/// Classify a path by its extension. Extensionless names are never media.
pub fn classify_path(path: &Path) -> Option<MediaKind> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(classify_extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_known_image_extensions() {
        for ext in &[
            "jpg", "jpeg", "png", "gif", "bmp", "webp", "avif", "tiff", "tif", "ico", "heic",
            "heif",
        ] {
            assert_eq!(
                classify_extension(ext),
                Some(MediaKind::Image),
                "expected Image for .{ext}"
            );
        }
    }

    #[test]
    fn classify_known_video_extensions() {
        for ext in &[
            "mp4", "webm", "mov", "avi", "mkv", "flv", "wmv", "m4v", "mpg", "mpeg", "ts",
        ] {
            assert_eq!(
                classify_extension(ext),
                Some(MediaKind::Video),
                "expected Video for .{ext}"
            );
        }
    }

    #[test]
    fn classify_non_media_returns_none() {
        assert_eq!(classify_extension("txt"), None);
        assert_eq!(classify_extension("json"), None);
        assert_eq!(classify_extension(""), None);
    }

    /// Matching must be case-insensitive so "JPG" counts like "jpg".
    #[test]
    fn classify_case_insensitive() {
        assert_eq!(classify_extension("JPG"), Some(MediaKind::Image));
        assert_eq!(classify_extension("WebM"), Some(MediaKind::Video));
        assert_eq!(classify_extension("PnG"), Some(MediaKind::Image));
    }

    #[test]
    fn classify_path_uses_final_extension() {
        assert_eq!(
            classify_path(Path::new("/data/shoot/raw.backup.jpeg")),
            Some(MediaKind::Image)
        );
        assert_eq!(classify_path(Path::new("/data/clip.MP4")), Some(MediaKind::Video));
        assert_eq!(classify_path(Path::new("/data/notes.txt")), None);
    }

    /// A bare filename with no dot has no extension and is not media, even
    /// when the name itself happens to equal a media extension.
    #[test]
    fn classify_path_without_extension() {
        assert_eq!(classify_path(Path::new("/data/README")), None);
        assert_eq!(classify_path(Path::new("/data/mp4")), None);
    }
}
