use serde::{Deserialize, Serialize};

use super::error::ScriptError;
use crate::domain::synthesis::ArtifactKey;

/// Who speaks a line of dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "staff")]
    Staff,
    #[serde(rename = "customer")]
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Customer => "customer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a turn waits for the learner or is voiced by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    Learner,
    System,
}

/// One line of a dialogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueTurn {
    pub role: Role,
    pub text: String,
    pub translation: String,
    pub turn_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_audio_ref: Option<String>,
}

impl DialogueTurn {
    pub fn new(
        role: Role,
        text: impl Into<String>,
        translation: impl Into<String>,
        turn_number: u32,
    ) -> Self {
        Self {
            role,
            text: text.into(),
            translation: translation.into(),
            turn_number,
            cached_audio_ref: None,
        }
    }

    pub fn kind(&self, learner_role: Role) -> TurnKind {
        if self.role == learner_role {
            TurnKind::Learner
        } else {
            TurnKind::System
        }
    }
}

/// Ordered, validated sequence of dialogue turns.
///
/// Turns are sorted by `turn_number` on construction. An empty script is
/// representable (lessons may carry no dialogue) and is rejected when
/// practice starts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogueScript {
    turns: Vec<DialogueTurn>,
}

impl DialogueScript {
    pub fn new(mut turns: Vec<DialogueTurn>) -> Result<Self, ScriptError> {
        turns.sort_by_key(|turn| turn.turn_number);

        for pair in turns.windows(2) {
            if pair[0].turn_number == pair[1].turn_number {
                return Err(ScriptError::DuplicateTurnNumber(pair[0].turn_number));
            }
        }

        for turn in &turns {
            if turn.text.trim().is_empty() {
                return Err(ScriptError::MalformedTurn {
                    turn_number: turn.turn_number,
                    reason: "dialogue text is blank".to_string(),
                });
            }
            if let Some(stored) = &turn.cached_audio_ref {
                if ArtifactKey::from_stored(stored).is_none() {
                    return Err(ScriptError::MalformedTurn {
                        turn_number: turn.turn_number,
                        reason: format!("cachedAudioRef {:?} is not an audio key", stored),
                    });
                }
            }
        }

        Ok(Self { turns })
    }

    pub fn turns(&self) -> &[DialogueTurn] {
        &self.turns
    }

    pub fn get(&self, index: usize) -> Option<&DialogueTurn> {
        self.turns.get(index)
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl<'de> Deserialize<'de> for DialogueScript {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let turns = Vec::<DialogueTurn>::deserialize(deserializer)?;
        DialogueScript::new(turns).map_err(serde::de::Error::custom)
    }
}
