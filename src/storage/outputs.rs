//! Persistence of generated avatars.
//!
//! Files are written under a single flat output directory with generated
//! names and served back by filename. Nothing is ever cleaned up from here;
//! the directory is append-only for the process lifetime.
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct OutputStore {
    dir: PathBuf,
}

/// A filename is only usable if it resolves to a direct child of the output
/// directory: one normal path component, no separators, no `..`.
fn sanitize(filename: &str) -> AppResult<()> {
    if filename.is_empty() || filename.contains('/') || filename.contains('\\') {
        return Err(AppError::NotFound(filename.to_string()));
    }
    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(AppError::NotFound(filename.to_string())),
    }
}

impl OutputStore {
    /// Open the store, creating the output directory if needed.
    pub async fn new(dir: impl Into<PathBuf>) -> AppResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(OutputStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist generated image bytes under a fresh collision-resistant name
    /// and return the filename.
    pub async fn save(&self, bytes: &[u8]) -> AppResult<String> {
        let suffix = Uuid::new_v4().simple().to_string();
        let filename = format!(
            "avatar_{}_{}.png",
            Utc::now().format("%Y%m%d_%H%M%S"),
            &suffix[..8]
        );
        fs::write(self.dir.join(&filename), bytes).await?;
        tracing::info!("Saved generated image: {}", filename);
        Ok(filename)
    }

    /// Read a previously generated file back by name.
    pub async fn read(&self, filename: &str) -> AppResult<Vec<u8>> {
        sanitize(filename)?;
        match fs::read(self.dir.join(filename)).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(AppError::NotFound(filename.to_string()))
            }
            Err(err) => Err(AppError::Write(err)),
        }
    }
}
