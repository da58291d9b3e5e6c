use super::artifact::{ArtifactKey, CachedArtifact, Resolution, AUDIO_CONTENT_TYPE};
use super::chunker::{concatenate, TextChunker, DEFAULT_MAX_CHUNK_LENGTH};
use super::error::SynthesisError;
use super::voice::{SpeechModel, Voice};
use crate::infrastructure::repositories::{AudioStorage, TtsRepository};
use moka::future::Cache;
use std::sync::Arc;
use std::time::{Duration, Instant};

const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);
const MEMO_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
pub struct SynthesisCacheConfig {
    pub max_chunk_length: usize,
    pub provider_timeout: Duration,
    /// Remember resolved keys in-process so repeat lookups skip the backends.
    pub memo_enabled: bool,
}

impl Default for SynthesisCacheConfig {
    fn default() -> Self {
        Self {
            max_chunk_length: DEFAULT_MAX_CHUNK_LENGTH,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            memo_enabled: true,
        }
    }
}

/// Content-addressed store of synthesized audio.
///
/// Lookup order for a key:
/// 1. in-process memo (when enabled)
/// 2. each storage backend, in priority order
/// 3. the synthesis provider, after which the audio is written to the first
///    backend that accepts it
///
/// Probing and writing are not atomic. Two concurrent misses for the same
/// key both synthesize and both write the same bytes, so every backend must
/// accept concurrent writes of one key.
pub struct SynthesisCache {
    tts_repo: Arc<dyn TtsRepository>,
    backends: Vec<Arc<dyn AudioStorage>>,
    chunker: TextChunker,
    provider_timeout: Duration,
    memo: Option<Cache<ArtifactKey, CachedArtifact>>,
}

impl SynthesisCache {
    pub fn new(
        tts_repo: Arc<dyn TtsRepository>,
        backends: Vec<Arc<dyn AudioStorage>>,
        config: SynthesisCacheConfig,
    ) -> Self {
        let memo = if config.memo_enabled {
            Some(Cache::builder().max_capacity(MEMO_CAPACITY).build())
        } else {
            None
        };

        Self {
            tts_repo,
            backends,
            chunker: TextChunker::new(config.max_chunk_length),
            provider_timeout: config.provider_timeout,
            memo,
        }
    }

    pub fn backend_ids(&self) -> Vec<&'static str> {
        self.backends.iter().map(|backend| backend.id()).collect()
    }

    /// Turn text into stored, playable audio.
    pub async fn resolve(
        &self,
        text: &str,
        voice: Voice,
        model: SpeechModel,
    ) -> Result<Resolution, SynthesisError> {
        if text.trim().is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        let key = ArtifactKey::derive(text, voice, model);

        if let Some(artifact) = self.lookup(&key).await {
            tracing::info!(
                key = %key,
                backend = artifact.backend,
                locator = %artifact.locator,
                "TTS cache hit - returning stored audio"
            );
            return Ok(Resolution {
                artifact,
                cache_hit: true,
            });
        }

        tracing::info!(key = %key, voice = %voice, model = %model, "TTS cache miss - synthesizing");

        let audio = self.synthesize(text, voice, model).await?;
        let artifact = self.put(&key, audio).await?;

        Ok(Resolution {
            artifact,
            cache_hit: false,
        })
    }

    pub async fn exists(&self, key: &ArtifactKey) -> bool {
        self.lookup(key).await.is_some()
    }

    /// Find a stored artifact without synthesizing.
    pub async fn lookup(&self, key: &ArtifactKey) -> Option<CachedArtifact> {
        if let Some(memo) = &self.memo {
            if let Some(artifact) = memo.get(key).await {
                return Some(artifact);
            }
        }

        for backend in &self.backends {
            match backend.stat(key).await {
                Ok(Some(size_bytes)) => {
                    let artifact = CachedArtifact {
                        key: key.clone(),
                        backend: backend.id(),
                        locator: backend.locator(key),
                        size_bytes,
                    };
                    self.remember(&artifact).await;
                    return Some(artifact);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        key = %key,
                        backend = backend.id(),
                        error = %e,
                        "Storage probe failed, treating as miss"
                    );
                }
            }
        }

        None
    }

    /// Persist audio through the backend fallback chain.
    pub async fn put(
        &self,
        key: &ArtifactKey,
        bytes: Vec<u8>,
    ) -> Result<CachedArtifact, SynthesisError> {
        let size_bytes = bytes.len() as u64;
        let mut failures = Vec::new();

        for backend in &self.backends {
            match backend.put(key, bytes.clone(), AUDIO_CONTENT_TYPE).await {
                Ok(locator) => {
                    tracing::info!(
                        key = %key,
                        backend = backend.id(),
                        locator = %locator,
                        audio_size = size_bytes,
                        "TTS audio stored"
                    );
                    let artifact = CachedArtifact {
                        key: key.clone(),
                        backend: backend.id(),
                        locator,
                        size_bytes,
                    };
                    self.remember(&artifact).await;
                    return Ok(artifact);
                }
                Err(e) => {
                    tracing::warn!(
                        key = %key,
                        backend = backend.id(),
                        error = %e,
                        "Storage write failed, falling back to next backend"
                    );
                    failures.push(format!("{}: {}", backend.id(), e));
                }
            }
        }

        tracing::error!(key = %key, "All storage backends failed");
        if failures.is_empty() {
            failures.push("no storage backend configured".to_string());
        }
        Err(SynthesisError::StorageExhausted(failures.join("; ")))
    }

    /// Synthesize every chunk in order and merge the audio.
    async fn synthesize(
        &self,
        text: &str,
        voice: Voice,
        model: SpeechModel,
    ) -> Result<Vec<u8>, SynthesisError> {
        let start_time = Instant::now();
        let chunks = self.chunker.split(text);
        tracing::info!(
            chunk_count = chunks.len(),
            text_length = text.chars().count(),
            max_chunk_length = self.chunker.max_length(),
            "Text split into chunks"
        );

        let mut parts = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let audio = tokio::time::timeout(
                self.provider_timeout,
                self.tts_repo.synthesize(chunk, voice, model),
            )
            .await
            .map_err(|_| {
                tracing::error!(
                    chunk_index = index,
                    timeout_secs = self.provider_timeout.as_secs_f64(),
                    "TTS provider timed out"
                );
                SynthesisError::ProviderTimeout(self.provider_timeout)
            })?
            .map_err(SynthesisError::Provider)?;

            tracing::debug!(
                chunk_index = index,
                chunk_audio_size = audio.len(),
                "Chunk synthesized"
            );
            parts.push(audio);
        }

        let audio = concatenate(parts);
        tracing::info!(
            voice = %voice,
            model = %model,
            latency_ms = start_time.elapsed().as_millis(),
            chunk_count = chunks.len(),
            audio_size_bytes = audio.len(),
            "TTS synthesis completed"
        );

        Ok(audio)
    }

    async fn remember(&self, artifact: &CachedArtifact) {
        if let Some(memo) = &self.memo {
            memo.insert(artifact.key.clone(), artifact.clone()).await;
        }
    }
}
