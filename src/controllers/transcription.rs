use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    infrastructure::repositories::{TranscriptionRepository, MAX_TRANSCRIPTION_BYTES},
};

#[derive(Debug, Deserialize)]
pub struct TranscribeQuery {
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub text: String,
}

pub struct TranscriptionController {
    repository: Arc<dyn TranscriptionRepository>,
    timeout: Duration,
}

impl TranscriptionController {
    pub fn new(repository: Arc<dyn TranscriptionRepository>, timeout: Duration) -> Self {
        Self { repository, timeout }
    }

    /// POST /api/transcribe?language=en - Body is the raw recording
    pub async fn transcribe(
        State(controller): State<Arc<TranscriptionController>>,
        Query(query): Query<TranscribeQuery>,
        body: Bytes,
    ) -> AppResult<Json<TranscriptionResponse>> {
        if body.is_empty() {
            return Err(AppError::BadRequest("Recording cannot be empty".to_string()));
        }

        if body.len() > MAX_TRANSCRIPTION_BYTES {
            return Err(AppError::PayloadTooLarge(
                "Recording must be 25 MB or less".to_string(),
            ));
        }

        let text = tokio::time::timeout(
            controller.timeout,
            controller.repository.transcribe(body.to_vec(), &query.language),
        )
        .await
        .map_err(|_| {
            AppError::ProviderTimeout(format!(
                "transcription did not finish within {:?}",
                controller.timeout
            ))
        })?
        .map_err(AppError::ExternalService)?;

        Ok(Json(TranscriptionResponse { text }))
    }
}
