use async_trait::async_trait;

/// Largest recording the transcription provider accepts.
pub const MAX_TRANSCRIPTION_BYTES: usize = 25 * 1024 * 1024;

/// Speech-to-text for learner recordings.
#[async_trait]
pub trait TranscriptionRepository: Send + Sync {
    /// Transcribe a recorded utterance. `language` is an ISO-639-1 hint.
    async fn transcribe(&self, audio: Vec<u8>, language: &str) -> Result<String, String>;
}

pub fn check_recording_size(len: usize) -> Result<(), String> {
    if len == 0 {
        return Err("recording is empty".to_string());
    }
    if len > MAX_TRANSCRIPTION_BYTES {
        return Err(format!(
            "recording is {} bytes, limit is {} bytes",
            len, MAX_TRANSCRIPTION_BYTES
        ));
    }
    Ok(())
}
