pub mod engine;
pub mod error;
pub mod events;
pub mod playback;
pub mod runner;
pub mod state;

pub use engine::TurnEngine;
pub use error::EngineError;
pub use events::EngineEvent;
pub use playback::{AudioSink, GestureGate, PlaybackController, PlaybackEvent, PlaybackTicket};
pub use runner::{PracticeCommand, PracticeRunner};
pub use state::{EngineState, HistoryEntry, TurnSession};
