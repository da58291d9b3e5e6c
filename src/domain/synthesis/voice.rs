use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Voices accepted by the synthesis provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Alloy,
    #[default]
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl Voice {
    pub const ALL: [Voice; 6] = [
        Voice::Alloy,
        Voice::Echo,
        Voice::Fable,
        Voice::Onyx,
        Voice::Nova,
        Voice::Shimmer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Shimmer => "shimmer",
        }
    }

    /// Parse a requested voice, falling back to the default for unknown values.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            None => Voice::default(),
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    requested = raw,
                    fallback = %Voice::default(),
                    "Unknown voice, using default"
                );
                Voice::default()
            }),
        }
    }
}

impl FromStr for Voice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Voice::ALL
            .into_iter()
            .find(|voice| voice.as_str() == wanted)
            .ok_or_else(|| format!("unknown voice: {}", s))
    }
}

impl std::fmt::Display for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Synthesis models accepted by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SpeechModel {
    #[default]
    #[serde(rename = "tts-1")]
    Tts1,
    #[serde(rename = "tts-1-hd")]
    Tts1Hd,
    #[serde(rename = "gpt-4o-mini-tts")]
    Gpt4oMiniTts,
}

impl SpeechModel {
    pub const ALL: [SpeechModel; 3] = [
        SpeechModel::Tts1,
        SpeechModel::Tts1Hd,
        SpeechModel::Gpt4oMiniTts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpeechModel::Tts1 => "tts-1",
            SpeechModel::Tts1Hd => "tts-1-hd",
            SpeechModel::Gpt4oMiniTts => "gpt-4o-mini-tts",
        }
    }

    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            None => SpeechModel::default(),
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    requested = raw,
                    fallback = %SpeechModel::default(),
                    "Unknown speech model, using default"
                );
                SpeechModel::default()
            }),
        }
    }
}

impl FromStr for SpeechModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SpeechModel::ALL
            .into_iter()
            .find(|model| model.as_str() == wanted)
            .ok_or_else(|| format!("unknown speech model: {}", s))
    }
}

impl std::fmt::Display for SpeechModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
