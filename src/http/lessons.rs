//! Lesson lookup, authoring and lesson-plan endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::content::{lesson_text, validate_required_vocabulary, validate_schema, PlanRequest};
use crate::http::response::{require_fields, run_blocking, ApiError, ApiOk, ApiResult, JsonBody};
use crate::http::sessions::lesson_path_from;
use crate::http::state::AppState;
use crate::storage::{DocumentStore, WriteMode};

/// Curriculum coordinates of one lesson, shared by several requests.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LessonLocator {
    pub lesson_ref: Option<String>,
    pub country: Option<String>,
    pub curriculum: Option<String>,
    pub grade: Option<String>,
    pub level: Option<String>,
    pub subject: Option<String>,
}

impl LessonLocator {
    fn path(&self) -> std::result::Result<crate::core::LessonPath, ApiError> {
        lesson_path_from(
            &self.lesson_ref,
            &self.country,
            &self.curriculum,
            &self.grade,
            &self.level,
            &self.subject,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LessonContentRequest {
    pub student_id: Option<String>,
    #[serde(flatten)]
    pub locator: LessonLocator,
}

/// POST /lesson-content
///
/// Lessons without `lessonContent`, `interactiveElements` or `quizzes`
/// answer with empty defaults for the missing parts.
pub async fn lesson_content(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<LessonContentRequest>,
) -> ApiResult {
    require_fields(&[("student_id", request.student_id.as_deref())])?;
    let path = request.locator.path()?;

    let app = state.clone();
    let found = run_blocking(state.request_timeout(), move || app.sessions().find_lesson(&path)).await?;

    let part = |key: &str, default: Value| found.data.get(key).cloned().unwrap_or(default);
    ApiOk::with_data(
        "Lesson content fetched",
        &json!({
            "lessonContent": part("lessonContent", json!({})),
            "interactiveElements": part("interactiveElements", json!([])),
            "quizzes": part("quizzes", json!([])),
        }),
    )
}

/// GET /get-sample-lesson-ref
pub async fn sample_lesson_ref(
    State(state): State<Arc<AppState>>,
    Query(locator): Query<LessonLocator>,
) -> ApiResult {
    let path = locator.path()?;

    let app = state.clone();
    let found = run_blocking(state.request_timeout(), move || app.sessions().find_lesson(&path)).await?;

    ApiOk::with_data(
        "Sample lesson reference retrieved",
        &json!({
            "lessonRef": locator.lesson_ref,
            "fullPath": found.path,
            "lessonData": found.data,
        }),
    )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateLessonRequest {
    #[serde(flatten)]
    pub locator: LessonLocator,
    pub lesson: Option<Value>,
}

/// POST /lessons
///
/// Stores an authored lesson after schema and vocabulary validation.
pub async fn create_lesson(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<CreateLessonRequest>,
) -> ApiResult {
    let path = request.locator.path()?;
    let Some(lesson) = request.lesson.filter(|l| !l.is_null()) else {
        return Err(ApiError::bad_request("Missing required fields: lesson"));
    };

    if let Err(violations) = validate_schema(&lesson) {
        tracing::debug!(path = %path, violations = violations.len(), "rejected lesson schema");
        return Err(ApiError::bad_request("Lesson failed schema validation")
            .with_data(json!({ "violations": violations })));
    }
    if state.config.content.enforce_vocabulary {
        validate_required_vocabulary(&state.catalog, &lesson_text(&lesson), &path.grade)?;
    }

    let Value::Object(mut document) = lesson else {
        return Err(ApiError::bad_request("Lesson must be a JSON object"));
    };
    document
        .entry("lessonRef")
        .or_insert_with(|| Value::String(path.lesson_ref.clone()));

    let full_path = path.document_path();
    let app = state.clone();
    let target = full_path.clone();
    run_blocking(state.request_timeout(), move || {
        app.store.set(&target, document, WriteMode::Overwrite)
    })
    .await?;

    tracing::info!(path = %full_path, "stored lesson");
    ApiOk::with_data(
        "Lesson stored",
        &json!({ "lessonRef": path.lesson_ref, "fullPath": full_path }),
    )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LessonPlanRequest {
    pub lesson_ref: Option<String>,
    pub student_id: Option<String>,
    pub learning_objectives: Vec<String>,
    pub country: Option<String>,
    pub curriculum: Option<String>,
    pub grade: Option<String>,
    pub level: Option<String>,
    pub subject: Option<String>,
}

/// POST /generate-lesson-plan
pub async fn generate_lesson_plan(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<LessonPlanRequest>,
) -> ApiResult {
    require_fields(&[("studentId", request.student_id.as_deref())])?;
    let path = lesson_path_from(
        &request.lesson_ref,
        &request.country,
        &request.curriculum,
        &request.grade,
        &request.level,
        &request.subject,
    )?;
    if request.learning_objectives.iter().all(|o| o.trim().is_empty()) {
        return Err(ApiError::bad_request("Missing required fields: learningObjectives"));
    }

    let plan_request = PlanRequest {
        lesson_ref: path.lesson_ref.clone(),
        student_id: request.student_id.unwrap_or_default(),
        learning_objectives: request.learning_objectives,
        country: path.country.clone(),
        curriculum: path.curriculum.clone(),
        grade: path.grade.clone(),
        subject: path.subject.clone(),
    };

    let app = state.clone();
    let plan = run_blocking(state.request_timeout(), move || {
        let found = app.sessions().find_lesson(&path)?;
        app.planner().generate(&plan_request, &found.data)
    })
    .await?;

    ApiOk::with_data("Lesson plan generated", &json!({ "lesson_plan": plan }))
}
