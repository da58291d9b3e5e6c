use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    domain::synthesis::{SpeechModel, SynthesisCache, Voice},
    error::{AppError, AppResult},
};

const MAX_TEXT_CHARS: usize = 10_000;

/// Request for POST /api/text-to-speech
#[derive(Debug, Serialize, Deserialize)]
pub struct TextToSpeechRequest {
    pub text: String,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToSpeechResponse {
    pub audio_url: String,
    pub cached: bool,
    pub key: String,
    pub size_bytes: u64,
}

pub struct TtsController {
    cache: Arc<SynthesisCache>,
    default_voice: Voice,
    default_model: SpeechModel,
}

impl TtsController {
    pub fn new(
        cache: Arc<SynthesisCache>,
        default_voice: Voice,
        default_model: SpeechModel,
    ) -> Self {
        Self {
            cache,
            default_voice,
            default_model,
        }
    }

    /// POST /api/text-to-speech - Resolve text to stored audio, synthesizing on a miss
    pub async fn synthesize(
        State(controller): State<Arc<TtsController>>,
        Json(request): Json<TextToSpeechRequest>,
    ) -> AppResult<Json<TextToSpeechResponse>> {
        if request.text.trim().is_empty() {
            return Err(AppError::BadRequest("Text cannot be empty".to_string()));
        }

        if request.text.chars().count() > MAX_TEXT_CHARS {
            return Err(AppError::PayloadTooLarge(
                "Text must be 10,000 characters or less".to_string(),
            ));
        }

        let voice = controller.voice_or_default(request.voice.as_deref());
        let model = controller.model_or_default(request.model.as_deref());

        let resolution = controller.cache.resolve(&request.text, voice, model).await?;
        let artifact = resolution.artifact;

        Ok(Json(TextToSpeechResponse {
            audio_url: artifact.locator.to_string(),
            cached: resolution.cache_hit,
            key: artifact.key.to_string(),
            size_bytes: artifact.size_bytes,
        }))
    }

    fn voice_or_default(&self, requested: Option<&str>) -> Voice {
        match requested {
            None => self.default_voice,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    requested = raw,
                    fallback = %self.default_voice,
                    "Unknown voice, using default"
                );
                self.default_voice
            }),
        }
    }

    fn model_or_default(&self, requested: Option<&str>) -> SpeechModel {
        match requested {
            None => self.default_model,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    requested = raw,
                    fallback = %self.default_model,
                    "Unknown model, using default"
                );
                self.default_model
            }),
        }
    }
}
