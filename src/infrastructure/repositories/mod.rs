pub mod audio_storage;
pub mod lesson_repository;
pub mod local_audio_storage;
pub mod openai_transcription_repository;
pub mod openai_tts_repository;
pub mod polly_tts_repository;
pub mod s3_audio_storage;
pub mod transcription_repository;
pub mod tts_repository;

pub use audio_storage::{AudioStorage, StorageError};
pub use lesson_repository::JsonLessonRepository;
pub use local_audio_storage::LocalAudioStorage;
pub use openai_transcription_repository::{
    OpenAiTranscriptionRepository, DEFAULT_TRANSCRIPTION_MODEL,
};
pub use openai_tts_repository::OpenAiTtsRepository;
pub use polly_tts_repository::PollyTtsRepository;
pub use s3_audio_storage::S3AudioStorage;
pub use transcription_repository::{
    check_recording_size, TranscriptionRepository, MAX_TRANSCRIPTION_BYTES,
};
pub use tts_repository::TtsRepository;
