use super::state::EngineState;
use crate::domain::dialogue::ScriptError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("dialogue script has no turns")]
    EmptyScript,
    #[error("invalid dialogue script: {0}")]
    InvalidScript(ScriptError),
    #[error("{operation} is not allowed while {state}")]
    InvalidState {
        operation: &'static str,
        state: EngineState,
    },
    #[error("no practice session is running")]
    NotStarted,
    #[error("no transcription provider is configured")]
    TranscriptionUnavailable,
}

impl From<ScriptError> for EngineError {
    fn from(err: ScriptError) -> Self {
        match err {
            ScriptError::Empty => EngineError::EmptyScript,
            other => EngineError::InvalidScript(other),
        }
    }
}
