//! File and stdout helpers for command handlers.

use atelier_error::{AtelierResult, StorageError, StorageErrorKind};
use serde::Serialize;
use std::path::Path;

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> AtelierResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| StorageError::new(StorageErrorKind::Serialization(e.to_string())))?;
    println!("{}", json);
    Ok(())
}

/// Read a local file to upload.
pub async fn read_file(path: &Path) -> AtelierResult<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileRead(format!(
            "{}: {}",
            path.display(),
            e
        )))
        .into()
    })
}

/// Write command output to a local file.
pub async fn write_file(path: &Path, bytes: &[u8]) -> AtelierResult<()> {
    tokio::fs::write(path, bytes).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "{}: {}",
            path.display(),
            e
        )))
        .into()
    })
}

/// Filename component of `path`.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Title derived from a path when none is given.
pub fn default_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name(path))
}

/// Guess a MIME type from a file extension.
pub fn guess_mimetype(path: &Path) -> String {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let mimetype = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        _ => "application/octet-stream",
    };
    mimetype.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_mimetype_by_extension() {
        assert_eq!(guess_mimetype(Path::new("logo.PNG")), "image/png");
        assert_eq!(guess_mimetype(Path::new("photo.jpg")), "image/jpeg");
        assert_eq!(guess_mimetype(Path::new("README")), "application/octet-stream");
    }

    #[test]
    fn test_default_title_uses_stem() {
        assert_eq!(default_title(Path::new("/tmp/brand logo.png")), "brand logo");
    }
}
