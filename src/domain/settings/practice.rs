use super::store::{Settings, KEY_MODEL, KEY_SPEECH_RATE, KEY_VOICE};
use crate::domain::dialogue::Role;
use crate::domain::synthesis::{SpeechModel, Voice};
use std::time::Duration;

const MIN_SPEECH_RATE: f32 = 0.5;
const MAX_SPEECH_RATE: f32 = 2.0;

/// Pauses the engine holds between steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PracticeTiming {
    /// Conversational pause after a system-voiced line.
    pub auto_advance_delay: Duration,
    pub success_feedback: Duration,
    pub failure_feedback: Duration,
    /// Upper bound on a single speech-to-text call.
    pub transcription_timeout: Duration,
}

impl Default for PracticeTiming {
    fn default() -> Self {
        Self {
            auto_advance_delay: Duration::from_millis(1500),
            success_feedback: Duration::from_millis(1500),
            failure_feedback: Duration::from_millis(3000),
            transcription_timeout: Duration::from_secs(30),
        }
    }
}

impl PracticeTiming {
    pub fn immediate() -> Self {
        Self {
            auto_advance_delay: Duration::ZERO,
            success_feedback: Duration::ZERO,
            failure_feedback: Duration::ZERO,
            transcription_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringPolicy {
    /// A score strictly above this passes the turn.
    pub success_threshold: f64,
    /// Phrase that passes any learner turn when spoken exactly. Disabled by
    /// default; kept for demo sessions.
    pub bypass_phrase: Option<String>,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            success_threshold: 0.5,
            bypass_phrase: None,
        }
    }
}

/// Everything a practice session needs to know about the learner's setup.
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeSettings {
    pub voice: Voice,
    pub model: SpeechModel,
    pub speech_rate: f32,
    pub learner_role: Role,
    /// Language hint passed to the transcription provider.
    pub language: String,
    pub timing: PracticeTiming,
    pub scoring: ScoringPolicy,
}

impl Default for PracticeSettings {
    fn default() -> Self {
        Self {
            voice: Voice::default(),
            model: SpeechModel::default(),
            speech_rate: 1.0,
            learner_role: Role::Staff,
            language: "en".to_string(),
            timing: PracticeTiming::default(),
            scoring: ScoringPolicy::default(),
        }
    }
}

impl PracticeSettings {
    /// Read voice, model and speech rate from the learner's stored settings.
    /// Missing or invalid entries fall back to defaults.
    pub fn from_store(store: &dyn Settings) -> Self {
        let speech_rate = store
            .get(KEY_SPEECH_RATE)
            .and_then(|raw| raw.parse::<f32>().ok())
            .filter(|rate| rate.is_finite())
            .map(|rate| rate.clamp(MIN_SPEECH_RATE, MAX_SPEECH_RATE))
            .unwrap_or(1.0);

        Self {
            voice: Voice::parse_or_default(store.get(KEY_VOICE).as_deref()),
            model: SpeechModel::parse_or_default(store.get(KEY_MODEL).as_deref()),
            speech_rate,
            ..Self::default()
        }
    }

    pub fn with_learner_role(mut self, role: Role) -> Self {
        self.learner_role = role;
        self
    }

    pub fn with_timing(mut self, timing: PracticeTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_bypass_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.scoring.bypass_phrase = Some(phrase.into());
        self
    }
}
