use crate::domain::dialogue::{Lesson, LessonLoadError, LessonRepository};
use std::collections::BTreeMap;
use std::path::Path;

/// Lessons loaded from `*.json` files in a directory at startup.
///
/// Every lesson's dialogue is validated on load, so a malformed lesson stops
/// the server from starting instead of failing mid-practice.
pub struct JsonLessonRepository {
    lessons: BTreeMap<String, Lesson>,
}

impl JsonLessonRepository {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, LessonLoadError> {
        let dir = dir.as_ref();
        let io_error = |source| LessonLoadError::Io {
            path: dir.display().to_string(),
            source,
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut lessons = Vec::with_capacity(paths.len());
        for path in paths {
            let raw = std::fs::read_to_string(&path).map_err(|source| LessonLoadError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let lesson: Lesson =
                serde_json::from_str(&raw).map_err(|source| LessonLoadError::Parse {
                    path: path.display().to_string(),
                    source,
                })?;
            lessons.push(lesson);
        }

        let repository = Self::from_lessons(lessons)?;
        tracing::info!(
            dir = %dir.display(),
            lesson_count = repository.lessons.len(),
            "Lessons loaded"
        );
        Ok(repository)
    }

    pub fn from_lessons(lessons: Vec<Lesson>) -> Result<Self, LessonLoadError> {
        let mut by_id = BTreeMap::new();

        for lesson in lessons {
            lesson
                .script()
                .map_err(|source| LessonLoadError::InvalidScript {
                    lesson_id: lesson.id.clone(),
                    source,
                })?;

            if by_id.contains_key(&lesson.id) {
                return Err(LessonLoadError::DuplicateId(lesson.id));
            }
            by_id.insert(lesson.id.clone(), lesson);
        }

        Ok(Self { lessons: by_id })
    }

    pub fn empty() -> Self {
        Self {
            lessons: BTreeMap::new(),
        }
    }
}

impl LessonRepository for JsonLessonRepository {
    fn list(&self) -> Vec<Lesson> {
        self.lessons.values().cloned().collect()
    }

    fn find(&self, id: &str) -> Option<Lesson> {
        self.lessons.get(id).cloned()
    }
}
