pub mod health;
pub mod lesson;
pub mod transcription;
pub mod tts;
