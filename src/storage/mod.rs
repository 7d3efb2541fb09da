//! Object storage for uploaded media.

use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

use image::{imageops::FilterType, ImageReader};
use tokio::fs;

use crate::error::{AppError, AppResult};

/// Avatars are stored as square thumbnails of this edge length
pub const AVATAR_SIZE: u32 = 300;
pub const AVATAR_JPEG_QUALITY: u8 = 80;
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `bytes` under `key` and returns the public URL
    async fn put_object(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> AppResult<String>;
}

/// Writes objects below a local directory that the HTTP server exposes
pub struct LocalObjectStorage {
    root: PathBuf,
    url_prefix: String,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `key` below the root, rejecting anything that could escape it
    fn object_path(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key);
        let is_plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !is_plain {
            return Err(AppError::InvalidInput(format!("Invalid object key: {}", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait::async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn put_object(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> AppResult<String> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create media directory: {}", e)))?;
        }

        fs::write(&path, &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write object {}: {}", key, e)))?;

        tracing::info!(key = %key, content_type = %content_type, size = bytes.len(), "Stored object");
        Ok(format!("{}/{}", self.url_prefix, key))
    }
}

/// Decodes an uploaded image and re-encodes it as a 300x300 JPEG
pub fn resize_avatar(bytes: &[u8]) -> AppResult<Vec<u8>> {
    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AppError::InvalidInput(format!("Unreadable image: {}", e)))?
        .decode()
        .map_err(|e| AppError::InvalidInput(format!("Unsupported image: {}", e)))?;

    let resized = image
        .resize_exact(AVATAR_SIZE, AVATAR_SIZE, FilterType::Triangle)
        .to_rgb8();

    let mut out = Cursor::new(Vec::new());
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, AVATAR_JPEG_QUALITY);
    resized
        .write_with_encoder(encoder)
        .map_err(|e| AppError::Internal(format!("Failed to encode avatar: {}", e)))?;

    Ok(out.into_inner())
}
