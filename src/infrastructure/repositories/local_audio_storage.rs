use super::audio_storage::{AudioStorage, StorageError};
use crate::domain::synthesis::{ArtifactKey, BackendId, Locator};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Audio files in a local directory, optionally served over HTTP under
/// `url_prefix`.
pub struct LocalAudioStorage {
    root: PathBuf,
    url_prefix: Option<String>,
}

impl LocalAudioStorage {
    pub fn new(root: impl Into<PathBuf>, url_prefix: Option<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.map(|prefix| prefix.trim_end_matches('/').to_string()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &ArtifactKey) -> PathBuf {
        self.root.join(key.object_name())
    }
}

#[async_trait]
impl AudioStorage for LocalAudioStorage {
    fn id(&self) -> BackendId {
        "local"
    }

    async fn stat(&self, key: &ArtifactKey) -> Result<Option<u64>, StorageError> {
        match tokio::fs::metadata(self.path_for(key)).await {
            Ok(metadata) if metadata.is_file() => Ok(Some(metadata.len())),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(
        &self,
        key: &ArtifactKey,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<Locator, StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;

        // Each writer gets its own temporary file; readers never see a
        // partial object and concurrent writers of one key all succeed.
        let path = self.path_for(key);
        let partial = self
            .root
            .join(format!("{}.{}.part", key.object_name(), Uuid::new_v4()));
        let written = match tokio::fs::write(&partial, &bytes).await {
            Ok(()) => tokio::fs::rename(&partial, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }

        tracing::debug!(
            path = %path.display(),
            size = bytes.len(),
            "Audio written to local storage"
        );
        Ok(self.locator(key))
    }

    fn locator(&self, key: &ArtifactKey) -> Locator {
        match &self.url_prefix {
            Some(prefix) => Locator::Url(format!("{}/{}", prefix, key.object_name())),
            None => Locator::Path(self.path_for(key)),
        }
    }
}
