use std::collections::HashMap;
use std::sync::RwLock;

pub const KEY_VOICE: &str = "ttsVoice";
pub const KEY_MODEL: &str = "ttsModel";
pub const KEY_SPEECH_RATE: &str = "speechRate";

/// Learner preferences persisted by the host (browser local storage in the
/// web shell). The core only reads them through this trait.
pub trait Settings: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
}

#[derive(Debug, Default)]
pub struct InMemorySettings {
    values: RwLock<HashMap<String, String>>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Settings for InMemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .ok()
            .and_then(|values| values.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.to_string(), value);
        }
    }
}
