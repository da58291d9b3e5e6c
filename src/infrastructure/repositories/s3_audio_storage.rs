use super::audio_storage::{AudioStorage, StorageError};
use crate::domain::synthesis::{ArtifactKey, BackendId, Locator};
use async_trait::async_trait;
use aws_sdk_s3::{primitives::ByteStream, Client as S3Client};
use std::sync::Arc;

const KEY_PREFIX: &str = "audio";

/// Public object storage for synthesized audio.
pub struct S3AudioStorage {
    client: Arc<S3Client>,
    bucket: String,
    public_base_url: String,
}

impl S3AudioStorage {
    pub fn new(client: Arc<S3Client>, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn object_key(key: &ArtifactKey) -> String {
        format!("{}/{}", KEY_PREFIX, key.object_name())
    }
}

#[async_trait]
impl AudioStorage for S3AudioStorage {
    fn id(&self) -> BackendId {
        "s3"
    }

    async fn stat(&self, key: &ArtifactKey) -> Result<Option<u64>, StorageError> {
        let object_key = Self::object_key(key);

        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
        {
            Ok(output) => {
                let size = output.content_length().unwrap_or_default().max(0) as u64;
                Ok(Some(size))
            }
            Err(e) => {
                if e.as_service_error().map(|se| se.is_not_found()).unwrap_or(false) {
                    return Ok(None);
                }
                Err(StorageError::ObjectStore(format!(
                    "head_object {} failed: {}",
                    object_key, e
                )))
            }
        }
    }

    async fn put(
        &self,
        key: &ArtifactKey,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Locator, StorageError> {
        let object_key = Self::object_key(key);
        let size = bytes.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    object_key = %object_key,
                    "S3 put_object failed"
                );
                StorageError::ObjectStore(format!("put_object {} failed: {}", object_key, e))
            })?;

        tracing::debug!(
            bucket = %self.bucket,
            object_key = %object_key,
            size,
            "Audio uploaded to S3"
        );
        Ok(self.locator(key))
    }

    fn locator(&self, key: &ArtifactKey) -> Locator {
        Locator::Url(format!("{}/{}", self.public_base_url, Self::object_key(key)))
    }
}
