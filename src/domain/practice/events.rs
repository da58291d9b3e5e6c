use super::state::HistoryEntry;
use crate::domain::dialogue::DialogueTurn;
use crate::domain::scoring::ScoreResult;

pub const SUCCESS_MESSAGE: &str = "Great pronunciation!";
pub const RETRY_MESSAGE: &str = "That wasn't quite right. Please try again.";
pub const RECOGNITION_RETRY_MESSAGE: &str = "We couldn't hear that clearly. Please try again.";

/// Signals emitted by the engine for the UI shell.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    TurnChanged {
        index: usize,
        turn: DialogueTurn,
    },
    Feedback {
        success: bool,
        message: String,
        score: Option<ScoreResult>,
    },
    TranscriptAppended(HistoryEntry),
    /// The prompt for this turn could not be synthesized; the learner can
    /// still answer or skip.
    AudioUnavailable {
        turn_number: u32,
        reason: String,
    },
    /// Autoplay is blocked until the learner interacts with the page.
    TapToPlay,
    Completed,
}
