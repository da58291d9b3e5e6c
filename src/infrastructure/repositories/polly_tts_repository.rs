use super::tts_repository::TtsRepository;
use crate::domain::synthesis::{SpeechModel, Voice};
use async_trait::async_trait;
use aws_sdk_polly::{
    types::{Engine, OutputFormat, VoiceId},
    Client as PollyClient,
};
use std::sync::Arc;

/// AWS Polly implementation of TTS repository
///
/// Polly has no notion of OpenAI voices or models, so each voice is paired
/// with a neural English voice of similar character and the model is only
/// logged.
pub struct PollyTtsRepository {
    polly_client: Arc<PollyClient>,
}

impl PollyTtsRepository {
    pub fn new(polly_client: Arc<PollyClient>) -> Self {
        Self { polly_client }
    }

    fn polly_voice(voice: Voice) -> &'static str {
        match voice {
            Voice::Alloy => "Joanna",
            Voice::Echo => "Matthew",
            Voice::Fable => "Amy",
            Voice::Onyx => "Joey",
            Voice::Nova => "Salli",
            Voice::Shimmer => "Kimberly",
        }
    }
}

#[async_trait]
impl TtsRepository for PollyTtsRepository {
    async fn synthesize(
        &self,
        text: &str,
        voice: Voice,
        model: SpeechModel,
    ) -> Result<Vec<u8>, String> {
        let start_time = std::time::Instant::now();

        let voice_name = Self::polly_voice(voice);
        let voice_id = VoiceId::from(voice_name);
        let engine = Engine::Neural;

        tracing::info!(
            voice = %voice,
            polly_voice = voice_name,
            requested_model = %model,
            engine = ?engine,
            output_format = "Mp3",
            text_length = text.len(),
            "Calling AWS Polly synthesize_speech"
        );

        let result = self
            .polly_client
            .synthesize_speech()
            .text(text)
            .voice_id(voice_id)
            .output_format(OutputFormat::Mp3)
            .engine(engine.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    error_display = %e,
                    polly_voice = voice_name,
                    engine = ?engine,
                    text_length = text.len(),
                    "AWS Polly synthesize_speech failed"
                );
                format!("AWS Polly error: {}", e)
            })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            format!("Failed to read audio stream: {}", e)
        })?;

        let audio_bytes = audio_stream.into_bytes().to_vec();
        let duration = start_time.elapsed();

        tracing::info!(
            provider = "polly",
            latency_ms = duration.as_millis(),
            characters_count = text.chars().count(),
            audio_size_bytes = audio_bytes.len(),
            "TTS synthesis completed"
        );

        Ok(audio_bytes)
    }
}
