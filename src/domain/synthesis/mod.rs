pub mod artifact;
pub mod cache;
pub mod chunker;
pub mod error;
pub mod voice;

pub use artifact::{
    normalize_text, ArtifactKey, AudioRef, BackendId, CachedArtifact, Locator, Resolution,
    AUDIO_CONTENT_TYPE,
};
pub use cache::{SynthesisCache, SynthesisCacheConfig};
pub use chunker::{TextChunker, DEFAULT_MAX_CHUNK_LENGTH};
pub use error::SynthesisError;
pub use voice::{SpeechModel, Voice};
