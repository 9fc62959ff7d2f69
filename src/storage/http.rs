use crate::config::FotonsConfig;
use crate::error::{ApiError, UploadError};
use crate::storage::{object_key, ImagePayload, ImageUploader};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{error, info};

/// Uploads to an object-storage REST endpoint (`POST {storage}/object/{bucket}/{key}`).
pub struct HttpImageUploader {
    pub client: Client,
    pub storage_url: String,
    pub public_url: String,
    pub bucket: String,
    pub key: String,
}

impl HttpImageUploader {
    pub fn new(storage_url: String, public_url: String, bucket: String, key: String) -> Self {
        Self {
            client: Client::new(),
            storage_url,
            public_url,
            bucket,
            key,
        }
    }

    pub fn from_config(config: &FotonsConfig) -> Self {
        Self::new(
            config.storage_url.clone(),
            config.storage_public_url.clone(),
            config.storage_bucket.clone(),
            config.storage_key.clone(),
        )
    }

    pub fn public_object_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_url.trim_end_matches('/'),
            self.bucket,
            key
        )
    }

    fn upload_url(&self, key: &str) -> String {
        format!(
            "{}/object/{}/{}",
            self.storage_url.trim_end_matches('/'),
            self.bucket,
            key
        )
    }
}

#[async_trait]
impl ImageUploader for HttpImageUploader {
    async fn upload(&self, payload: &ImagePayload, folder: &str) -> Result<String, UploadError> {
        payload.validate()?;

        if self.storage_url.is_empty() || self.key.is_empty() {
            return Err(UploadError::NotConfigured);
        }

        let key = object_key(folder, &payload.file_name, Utc::now().timestamp_millis());
        let res = self
            .client
            .post(self.upload_url(&key))
            .bearer_auth(&self.key)
            .header(CONTENT_TYPE, payload.mime_type.as_str())
            .body(payload.bytes.clone())
            .send()
            .await;

        match res {
            Ok(response) if response.status().is_success() => {
                let url = self.public_object_url(&key);
                info!(%url, size = payload.bytes.len(), "Upload successful");
                Ok(url)
            }
            Ok(response) => {
                let status = response.status();
                error!(%status, %key, "Object storage rejected upload");
                Err(UploadError::Failed(ApiError::Status {
                    status,
                    message: "upload rejected".to_string(),
                }))
            }
            Err(e) => {
                error!(error = %e, %key, "Failed to reach object storage");
                Err(UploadError::Failed(ApiError::Transport(e)))
            }
        }
    }
}
