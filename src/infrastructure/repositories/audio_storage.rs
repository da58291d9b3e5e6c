use crate::domain::synthesis::{ArtifactKey, BackendId, Locator};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
    #[error("object store error: {0}")]
    ObjectStore(String),
}

/// One storage medium in the audio fallback chain.
///
/// Every backend stores an artifact under `key.object_name()` and can say
/// where a stored artifact is served from without touching the medium.
#[async_trait]
pub trait AudioStorage: Send + Sync {
    fn id(&self) -> BackendId;

    /// Size of the stored artifact, or `None` when it is absent.
    async fn stat(&self, key: &ArtifactKey) -> Result<Option<u64>, StorageError>;

    async fn exists(&self, key: &ArtifactKey) -> Result<bool, StorageError> {
        Ok(self.stat(key).await?.is_some())
    }

    /// Store (or overwrite) an artifact and return its public locator.
    async fn put(
        &self,
        key: &ArtifactKey,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Locator, StorageError>;

    fn locator(&self, key: &ArtifactKey) -> Locator;
}
