//! Image upload collaborator: local validation plus the uploader seam.

use crate::error::UploadError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

pub mod http;

pub use http::HttpImageUploader;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const IMAGES_FOLDER: &str = "images";
pub const THUMBNAILS_FOLDER: &str = "thumbnails";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Reads a file and sniffs its MIME type from the content, not the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        let mime_type = sniff_mime_type(&bytes);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    pub fn validate(&self) -> Result<(), UploadError> {
        if !self.mime_type.starts_with("image/") {
            return Err(UploadError::NotAnImage(self.mime_type.clone()));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(UploadError::TooLarge(self.bytes.len()));
        }
        Ok(())
    }
}

pub fn sniff_mime_type(bytes: &[u8]) -> String {
    image::guess_format(bytes)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string())
}

pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `<folder>/<unix-millis>-<sanitized-name>`
pub fn object_key(folder: &str, file_name: &str, timestamp_millis: i64) -> String {
    format!(
        "{}/{}-{}",
        folder.trim_matches('/'),
        timestamp_millis,
        sanitize_file_name(file_name)
    )
}

#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Stores the image and returns its public URL.
    async fn upload(&self, payload: &ImagePayload, folder: &str) -> Result<String, UploadError>;
}

/// Uploads in order and stops at the first failure.
pub async fn upload_many(
    uploader: &dyn ImageUploader,
    payloads: &[ImagePayload],
    folder: &str,
) -> Result<Vec<String>, UploadError> {
    let mut urls = Vec::with_capacity(payloads.len());
    for payload in payloads {
        urls.push(uploader.upload(payload, folder).await?);
    }
    info!(count = urls.len(), folder, "Uploaded image batch");
    Ok(urls)
}
