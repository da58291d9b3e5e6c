use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    domain::dialogue::{KeyPhrase, Lesson, LessonRepository},
    error::{AppError, AppResult},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonSummary {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub level: Option<String>,
    pub key_phrase: Option<KeyPhrase>,
    pub turn_count: usize,
}

impl From<Lesson> for LessonSummary {
    fn from(lesson: Lesson) -> Self {
        Self {
            turn_count: lesson.dialogue_turns.len(),
            id: lesson.id,
            title: lesson.title,
            description: lesson.description,
            level: lesson.level,
            key_phrase: lesson.key_phrase,
        }
    }
}

pub struct LessonController {
    repository: Arc<dyn LessonRepository>,
}

impl LessonController {
    pub fn new(repository: Arc<dyn LessonRepository>) -> Self {
        Self { repository }
    }

    /// GET /api/lessons
    pub async fn list_lessons(
        State(controller): State<Arc<LessonController>>,
    ) -> Json<Vec<LessonSummary>> {
        Json(
            controller
                .repository
                .list()
                .into_iter()
                .map(LessonSummary::from)
                .collect(),
        )
    }

    /// GET /api/lessons/:lessonId - Full lesson including its dialogue
    pub async fn get_lesson(
        State(controller): State<Arc<LessonController>>,
        Path(lesson_id): Path<String>,
    ) -> AppResult<Json<Lesson>> {
        controller
            .repository
            .find(&lesson_id)
            .map(Json)
            .ok_or_else(|| AppError::NotFound(format!("lesson {}", lesson_id)))
    }
}
