//! Header image upload to the third-party image host

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::config::UploadConfig;

/// Largest image accepted for upload
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Image upload is not configured: set SITEDASH_CLOUDINARY_CLOUD_NAME and SITEDASH_CLOUDINARY_UPLOAD_PRESET")]
    NotConfigured,
    #[error("Please select an image file")]
    NotAnImage,
    #[error("File size must be less than 5MB")]
    TooLarge(u64),
    #[error("Could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Upload error, check your connection and try again: {0}")]
    Transport(String),
    #[error("Upload failed. Please try again.")]
    NoUrl,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

/// Uploads images with an unsigned upload preset
#[derive(Debug, Clone)]
pub struct ImageUploader {
    endpoint: String,
    upload_preset: String,
    client: Client,
}

impl ImageUploader {
    /// Build an uploader for the configured cloud; both the cloud name and
    /// the preset are required
    pub fn from_config(config: &UploadConfig, timeout: Duration) -> Result<Self, UploadError> {
        let cloud_name = config
            .cloud_name
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or(UploadError::NotConfigured)?;
        let preset = config
            .upload_preset
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or(UploadError::NotConfigured)?;

        Self::with_endpoint(
            format!("https://api.cloudinary.com/v1_1/{cloud_name}/upload"),
            preset,
            timeout,
        )
    }

    pub fn with_endpoint(
        endpoint: impl Into<String>,
        upload_preset: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.into(),
            upload_preset: upload_preset.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upload a file and return its public URL
    pub async fn upload(&self, path: &Path) -> Result<String, UploadError> {
        let mime = check_image(path)?;
        let bytes = std::fs::read(path).map_err(|source| UploadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone());

        let resp = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        // The host reports failures in the body; only `secure_url` matters
        let body: UploadResponse = resp
            .json()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let url = body.secure_url.ok_or(UploadError::NoUrl)?;
        tracing::info!("Uploaded {} to {}", path.display(), url);
        Ok(url)
    }
}

/// Check type and size before uploading; returns the MIME type
pub fn check_image(path: &Path) -> Result<&'static str, UploadError> {
    let mime = image_mime(path).ok_or(UploadError::NotAnImage)?;
    let size = std::fs::metadata(path)
        .map_err(|source| UploadError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    if size > MAX_IMAGE_BYTES {
        return Err(UploadError::TooLarge(size));
    }
    Ok(mime)
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Extensions offered by the file picker
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
