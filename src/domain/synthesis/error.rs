use crate::error::AppError;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("text to synthesize is empty")]
    EmptyText,
    #[error("synthesis provider failed: {0}")]
    Provider(String),
    #[error("synthesis provider did not answer within {0:?}")]
    ProviderTimeout(Duration),
    #[error("could not save audio: {0}")]
    StorageExhausted(String),
}

impl From<SynthesisError> for AppError {
    fn from(err: SynthesisError) -> Self {
        match err {
            SynthesisError::EmptyText => AppError::BadRequest(err.to_string()),
            SynthesisError::Provider(msg) => AppError::ExternalService(msg),
            SynthesisError::ProviderTimeout(_) => AppError::ProviderTimeout(err.to_string()),
            SynthesisError::StorageExhausted(msg) => AppError::Internal(msg),
        }
    }
}
