//! Lesson lookup by curriculum path.

use serde_json::Value;

use crate::core::LessonPath;
use crate::error::{LecternError, Result};
use crate::storage::DocumentStore;

/// A lesson document and the path it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct FoundLesson {
    pub path: String,
    pub data: Value,
}

/// Read the lesson at `path`.
///
/// Missing `lessonRef`, `subject` and `gradeLevel` fields are filled from
/// the path.
pub fn find_lesson<S: DocumentStore + ?Sized>(store: &S, path: &LessonPath) -> Result<FoundLesson> {
    let document_path = path.document_path();
    let Some(mut document) = store.get(&document_path)? else {
        tracing::warn!(path = %document_path, "lesson not found");
        return Err(LecternError::not_found("lesson", &path.lesson_ref));
    };

    for (key, default) in [
        ("lessonRef", &path.lesson_ref),
        ("subject", &path.subject),
        ("gradeLevel", &path.grade),
    ] {
        document
            .entry(key)
            .or_insert_with(|| Value::String(default.clone()));
    }

    tracing::debug!(path = %document_path, "found lesson");
    Ok(FoundLesson {
        path: document_path,
        data: Value::Object(document),
    })
}
