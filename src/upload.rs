//! Image input.
//!
//! Reads a user-selected file and hands it to the session as a data URI.
//! The only check is that a non-empty file was selected.

use crate::error::{AppError, AppResult};
use crate::models::ImageRef;
use std::path::Path;
use tracing::debug;

/// Guess a MIME type from the file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("dcm") => "application/dicom",
        _ => "application/octet-stream",
    }
}

/// Load an image file as an [`ImageRef`].
pub fn load_image(path: &Path) -> AppResult<ImageRef> {
    let bytes = std::fs::read(path).map_err(|source| AppError::ImageRead {
        path: path.to_path_buf(),
        source,
    })?;

    if bytes.is_empty() {
        return Err(AppError::EmptyImage(path.to_path_buf()));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime = mime_for_path(path);

    debug!("Loaded {} ({} bytes, {})", name, bytes.len(), mime);
    Ok(ImageRef::from_bytes(name, mime, &bytes))
}
