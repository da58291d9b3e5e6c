use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use super::voice::{SpeechModel, Voice};

/// Name of a storage backend, e.g. `"s3"` or `"local"`.
pub type BackendId = &'static str;

pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

const KEY_HEX_LEN: usize = 64;

/// Content-derived identity of a synthesized audio artifact.
///
/// The digest covers the normalized text, the voice and the model and
/// nothing else, so identical requests always map to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ArtifactKey(String);

impl ArtifactKey {
    pub fn derive(text: &str, voice: Voice, model: SpeechModel) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(normalize_text(text).as_bytes());
        hasher.update([0x1f]);
        hasher.update(voice.as_str().as_bytes());
        hasher.update([0x1f]);
        hasher.update(model.as_str().as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Wrap a key that was derived earlier, e.g. one recorded in a lesson
    /// file by the audio pre-generation tool. Anything other than a 64-digit
    /// hex digest is rejected, since keys become object names and paths.
    pub fn from_stored(key: &str) -> Option<Self> {
        let key = key.trim();
        if key.len() != KEY_HEX_LEN || !key.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(key.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Object name used by every storage backend.
    pub fn object_name(&self) -> String {
        format!("{}.mp3", self.0)
    }
}

impl std::fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trim and collapse whitespace runs so formatting differences share a key.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Where a stored artifact can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Locator {
    Url(String),
    Path(PathBuf),
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Url(url) => write!(f, "{}", url),
            Locator::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedArtifact {
    pub key: ArtifactKey,
    pub backend: BackendId,
    pub locator: Locator,
    pub size_bytes: u64,
}

/// Outcome of [`SynthesisCache::resolve`](super::SynthesisCache::resolve).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub artifact: CachedArtifact,
    pub cache_hit: bool,
}

impl Resolution {
    pub fn audio_ref(&self) -> AudioRef {
        AudioRef {
            key: self.artifact.key.clone(),
            locator: self.artifact.locator.clone(),
            cache_hit: self.cache_hit,
        }
    }
}

/// Playable audio handed from the cache to playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioRef {
    pub key: ArtifactKey,
    pub locator: Locator,
    pub cache_hit: bool,
}
