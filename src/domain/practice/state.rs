use serde::Serialize;
use uuid::Uuid;

use crate::domain::dialogue::Role;
use crate::domain::scoring::ScoreResult;

/// States of the dialogue practice engine.
///
/// ```text
/// Idle ──start──▶ PlayingPrompt ──prompt finished──▶ AwaitingLearnerSpeech   (learner turn)
///                                                ──▶ AutoAdvancing ──▶ Advancing (system turn)
/// AwaitingLearnerSpeech ──utterance──▶ Scoring ──▶ Feedback ──pass──▶ Advancing
///                                                          ──fail──▶ AwaitingLearnerSpeech
/// AwaitingLearnerSpeech ──skip──▶ Advancing
/// Advancing ──more turns──▶ PlayingPrompt
///           ──last turn──▶ Completed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum EngineState {
    #[default]
    Idle,
    PlayingPrompt,
    AwaitingLearnerSpeech,
    AutoAdvancing,
    Scoring,
    Feedback,
    Advancing,
    Completed,
}

impl EngineState {
    pub fn label(&self) -> &'static str {
        match self {
            EngineState::Idle => "idle",
            EngineState::PlayingPrompt => "playing prompt",
            EngineState::AwaitingLearnerSpeech => "awaiting learner speech",
            EngineState::AutoAdvancing => "auto-advancing",
            EngineState::Scoring => "scoring",
            EngineState::Feedback => "showing feedback",
            EngineState::Advancing => "advancing",
            EngineState::Completed => "completed",
        }
    }

    /// `true` while the engine is working through a step and ignores input.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            EngineState::AutoAdvancing
                | EngineState::Scoring
                | EngineState::Feedback
                | EngineState::Advancing
        )
    }
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Run-time state of one practice session. Owned by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnSession {
    pub id: Uuid,
    pub current_turn_index: usize,
    pub state: EngineState,
    pub last_transcript: Option<String>,
    pub last_score: Option<ScoreResult>,
    pub retry_count: u32,
}

impl TurnSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            current_turn_index: 0,
            state: EngineState::Idle,
            last_transcript: None,
            last_score: None,
            retry_count: 0,
        }
    }
}

impl Default for TurnSession {
    fn default() -> Self {
        Self::new()
    }
}

/// A line shown in the visible conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub role: Role,
    pub text: String,
    pub translation: String,
    pub spoken_by_learner: bool,
}
