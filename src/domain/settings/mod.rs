pub mod practice;
pub mod store;

pub use practice::{PracticeSettings, PracticeTiming, ScoringPolicy};
pub use store::{InMemorySettings, Settings, KEY_MODEL, KEY_SPEECH_RATE, KEY_VOICE};
