//! Validation of uploaded files.
//!
//! Acceptance is by filename extension and byte size only; the bytes are
//! forwarded to the model untouched, so no content sniffing happens here.
use crate::error::{AppError, AppResult};

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// One uploaded photograph, alive for the duration of a single request.
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

fn extension(filename: &str) -> Option<String> {
    filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Check if the file extension is allowed.
pub fn allowed_file(filename: &str) -> bool {
    extension(filename)
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Accept or reject an upload based on its declared filename and size.
pub fn validate_upload(filename: &str, size: usize) -> AppResult<()> {
    if !allowed_file(filename) {
        return Err(AppError::UnsupportedType(filename.to_string()));
    }
    if size > MAX_FILE_SIZE {
        return Err(AppError::TooLarge(size));
    }
    Ok(())
}

/// Mime type for an already-validated filename. `image/jpg` is not a
/// registered type, so both jpg and jpeg map to `image/jpeg`.
pub fn mime_for_filename(filename: &str) -> &'static str {
    match extension(filename).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
