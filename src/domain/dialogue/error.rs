#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScriptError {
    #[error("dialogue script has no turns")]
    Empty,
    #[error("turn {turn_number} is malformed: {reason}")]
    MalformedTurn { turn_number: u32, reason: String },
    #[error("turn number {0} appears more than once")]
    DuplicateTurnNumber(u32),
}

#[derive(Debug, thiserror::Error)]
pub enum LessonLoadError {
    #[error("cannot read lessons from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("lesson file {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("lesson {lesson_id} has an invalid dialogue: {source}")]
    InvalidScript {
        lesson_id: String,
        #[source]
        source: ScriptError,
    },
    #[error("lesson id {0} is defined more than once")]
    DuplicateId(String),
}
