//! Bucket upload client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use tracing::debug;

use super::{MediaStorage, StorageError, StorageResult};
use crate::config::StorageConfig;

/// REST client for the media bucket.
pub struct BucketStorage {
    config: StorageConfig,
    client: reqwest::Client,
}

impl BucketStorage {
    pub fn new(config: StorageConfig) -> StorageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/object/{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.bucket,
            path
        )
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/object/public/{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.bucket,
            path
        )
    }
}

#[async_trait]
impl MediaStorage for BucketStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        debug!("Uploading {} bytes to {}", bytes.len(), path);
        let response = self
            .client
            .post(self.object_url(path))
            .header("apikey", &self.config.api_key)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header(header::CONTENT_TYPE, content_type.to_string())
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected { status, body });
        }

        Ok(self.public_url(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> BucketStorage {
        BucketStorage::new(StorageConfig {
            endpoint: "https://storage.example.com/storage/v1/".to_string(),
            api_key: "test-key".to_string(),
            bucket: "videos".to_string(),
            timeout_seconds: 5,
        })
        .expect("client builds")
    }

    #[test]
    fn object_url_includes_bucket_and_path() {
        let storage = storage();
        assert_eq!(
            storage.object_url("c1/1700000000000.mp4"),
            "https://storage.example.com/storage/v1/object/videos/c1/1700000000000.mp4"
        );
    }

    #[test]
    fn public_url_is_under_the_public_prefix() {
        let storage = storage();
        assert_eq!(
            storage.public_url("thumbnails/c1_1.png"),
            "https://storage.example.com/storage/v1/object/public/videos/thumbnails/c1_1.png"
        );
    }
}
