use serde::{Deserialize, Serialize};

use super::{DialogueScript, DialogueTurn, ScriptError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPhrase {
    pub english: String,
    pub japanese: String,
}

/// Lesson definition as supplied by the lesson store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub key_phrase: Option<KeyPhrase>,
    #[serde(default)]
    pub dialogue_turns: Vec<DialogueTurn>,
}

impl Lesson {
    /// Build the practice script for this lesson.
    pub fn script(&self) -> Result<DialogueScript, ScriptError> {
        DialogueScript::new(self.dialogue_turns.clone())
    }
}
