pub mod error;
pub mod lesson;
pub mod model;

pub use error::{LessonLoadError, ScriptError};
pub use lesson::{KeyPhrase, Lesson};
pub use model::{DialogueScript, DialogueTurn, Role, TurnKind};

/// Read-only access to lesson definitions
pub trait LessonRepository: Send + Sync {
    /// All lessons, ordered by id
    fn list(&self) -> Vec<Lesson>;
    fn find(&self, id: &str) -> Option<Lesson>;
}
