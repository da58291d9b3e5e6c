use super::transcription_repository::{check_recording_size, TranscriptionRepository};
use async_openai::{
    config::OpenAIConfig,
    types::{AudioInput, CreateTranscriptionRequestArgs},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";

/// OpenAI Whisper implementation of the transcription repository
pub struct OpenAiTranscriptionRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiTranscriptionRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl TranscriptionRepository for OpenAiTranscriptionRepository {
    async fn transcribe(&self, audio: Vec<u8>, language: &str) -> Result<String, String> {
        check_recording_size(audio.len())?;

        let start_time = std::time::Instant::now();
        let audio_size = audio.len();

        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8("recording.webm".to_string(), audio))
            .model(self.model.as_str())
            .language(language)
            .build()
            .map_err(|e| format!("Invalid transcription request: {}", e))?;

        let response = self.client.audio().transcribe(request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                model = %self.model,
                audio_size_bytes = audio_size,
                "OpenAI transcription failed"
            );
            format!("OpenAI transcription error: {}", e)
        })?;

        tracing::info!(
            provider = "openai",
            model = %self.model,
            language,
            latency_ms = start_time.elapsed().as_millis(),
            audio_size_bytes = audio_size,
            transcript_length = response.text.len(),
            "Transcription completed"
        );

        Ok(response.text.trim().to_string())
    }
}
