use crate::domain::synthesis::{SpeechModel, Voice};
use async_trait::async_trait;

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider (OpenAI, AWS Polly, ...)
///
/// Implementations synthesize exactly the text they are given. Splitting
/// long text and merging the audio is done by the synthesis cache, so every
/// provider sees provider-safe chunks.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize one chunk of text
    ///
    /// Returns MP3 audio bytes
    ///
    /// # Errors
    /// Returns error if synthesis fails or provider is unavailable
    async fn synthesize(
        &self,
        text: &str,
        voice: Voice,
        model: SpeechModel,
    ) -> Result<Vec<u8>, String>;
}
