//! Loading of the fixed style reference images.
//!
//! The two reference files live in the public directory and are read once at
//! process start. A missing file is logged and skipped rather than treated as
//! fatal; the health route reports how many references loaded.
use std::path::Path;

use tokio::fs;

use crate::upload::mime_for_filename;

/// A fixed example image shown to the model to steer output style.
/// Immutable for the process lifetime.
#[derive(Clone)]
pub struct ReferenceImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

pub const REFERENCE_FILES: &[&str] = &["reference-avatar-1.png", "reference-avatar-2.png"];

pub async fn load_reference_images(public_dir: &str) -> Vec<ReferenceImage> {
    let mut references = Vec::new();
    for name in REFERENCE_FILES {
        let path = Path::new(public_dir).join(name);
        match fs::read(&path).await {
            Ok(bytes) => {
                tracing::info!("Loaded reference image: {}", name);
                references.push(ReferenceImage {
                    bytes,
                    mime_type: mime_for_filename(name).to_string(),
                });
            }
            Err(err) => {
                tracing::warn!("Reference image not found: {} ({})", path.display(), err);
            }
        }
    }
    tracing::info!("Loaded {} reference images", references.len());
    references
}
