use super::tts_repository::TtsRepository;
use crate::domain::synthesis::{SpeechModel, Voice};
use async_openai::{
    config::OpenAIConfig,
    types::{CreateSpeechRequest, SpeechModel as OpenAiModel, Voice as OpenAiVoice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// OpenAI TTS implementation of TTS repository
pub struct OpenAiTtsRepository {
    client: Arc<Client<OpenAIConfig>>,
}

impl OpenAiTtsRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>) -> Self {
        Self { client }
    }
}

fn openai_voice(voice: Voice) -> OpenAiVoice {
    match voice {
        Voice::Alloy => OpenAiVoice::Alloy,
        Voice::Echo => OpenAiVoice::Echo,
        Voice::Fable => OpenAiVoice::Fable,
        Voice::Onyx => OpenAiVoice::Onyx,
        Voice::Nova => OpenAiVoice::Nova,
        Voice::Shimmer => OpenAiVoice::Shimmer,
    }
}

fn openai_model(model: SpeechModel) -> OpenAiModel {
    match model {
        SpeechModel::Tts1 => OpenAiModel::Tts1,
        SpeechModel::Tts1Hd => OpenAiModel::Tts1Hd,
        other => OpenAiModel::Other(other.as_str().to_string()),
    }
}

#[async_trait]
impl TtsRepository for OpenAiTtsRepository {
    async fn synthesize(
        &self,
        text: &str,
        voice: Voice,
        model: SpeechModel,
    ) -> Result<Vec<u8>, String> {
        let start_time = std::time::Instant::now();

        tracing::info!(
            model = %model,
            voice = %voice,
            text_length = text.len(),
            "Calling OpenAI TTS API"
        );

        let request = CreateSpeechRequest {
            model: openai_model(model),
            input: text.to_string(),
            voice: openai_voice(voice),
            response_format: None, // Defaults to MP3
            speed: None,
        };

        let response = self
            .client
            .audio()
            .speech(request)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    model = %model,
                    voice = %voice,
                    text_length = text.len(),
                    "OpenAI TTS API call failed"
                );
                format!("OpenAI TTS error: {}", e)
            })?;

        let audio_bytes = response.bytes.to_vec();
        let duration = start_time.elapsed();

        tracing::info!(
            provider = "openai",
            model = %model,
            voice = %voice,
            latency_ms = duration.as_millis(),
            characters_count = text.chars().count(),
            audio_size_bytes = audio_bytes.len(),
            "TTS synthesis completed"
        );

        Ok(audio_bytes)
    }
}
