//! Report, tutoring and summary endpoints.

use std::sync::Arc;

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::response::{require_fields, run_blocking, ApiError, ApiOk, ApiResult, JsonBody};
use crate::http::state::AppState;
use crate::report::{Homework, LessonNotes, NotesContent, NotesSource};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FinalReportRequest {
    pub student_id: Option<String>,
    pub lesson_ref: Option<String>,
    pub analytics_data: Option<Value>,
    pub bloom_data: Option<Value>,
}

/// Present and not JSON null.
fn present(value: &Option<Value>) -> Option<&str> {
    value.as_ref().filter(|v| !v.is_null()).map(|_| "present")
}

/// POST /generate-final-report
pub async fn generate_final_report(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<FinalReportRequest>,
) -> ApiResult {
    require_fields(&[
        ("analytics_data", present(&request.analytics_data)),
        ("bloom_data", present(&request.bloom_data)),
        ("student_id", request.student_id.as_deref()),
        ("lesson_ref", request.lesson_ref.as_deref()),
    ])?;

    let app = state.clone();
    let report = run_blocking(state.request_timeout(), move || {
        app.reports().generate_final_report(
            request.student_id.as_deref().unwrap_or_default(),
            request.lesson_ref.as_deref().unwrap_or_default(),
            request.analytics_data.as_ref().unwrap_or(&Value::Null),
            request.bloom_data.as_ref().unwrap_or(&Value::Null),
        )
    })
    .await?;

    ApiOk::with_data(
        "Final merged report generated successfully",
        &json!({ "report": report }),
    )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GenerateNotesRequest {
    pub lesson_ref: Option<String>,
    pub subject: Option<String>,
    pub grade: Option<String>,
    pub lesson_data: NotesSource,
}

/// POST /generate-lesson-notes
///
/// Returns the notes without storing them.
pub async fn generate_lesson_notes(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<GenerateNotesRequest>,
) -> ApiResult {
    require_fields(&[
        ("lesson_ref", request.lesson_ref.as_deref()),
        ("subject", request.subject.as_deref()),
        ("grade", request.grade.as_deref()),
    ])?;

    let app = state.clone();
    let notes = run_blocking(state.request_timeout(), move || {
        app.notes().generate_notes(
            request.lesson_ref.as_deref().unwrap_or_default().trim(),
            request.subject.as_deref().unwrap_or_default().trim(),
            request.grade.as_deref().unwrap_or_default().trim(),
            &request.lesson_data,
        )
    })
    .await?;

    ApiOk::with_data("Notes generated successfully", &notes)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SaveNotesRequest {
    pub lesson_ref: Option<String>,
    pub subject: String,
    pub grade_level: String,
    pub theme: String,
    pub topic: String,
    pub lesson_title: String,
    pub learning_objectives: Vec<String>,
    pub content: NotesContent,
    pub homework: Homework,
}

/// POST /save-lesson-notes
pub async fn save_lesson_notes(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<SaveNotesRequest>,
) -> ApiResult {
    require_fields(&[("lesson_ref", request.lesson_ref.as_deref())])?;
    let notes = LessonNotes {
        lesson_ref: request.lesson_ref.unwrap_or_default().trim().to_string(),
        subject: request.subject,
        grade_level: request.grade_level,
        theme: request.theme,
        topic: request.topic,
        lesson_title: request.lesson_title,
        learning_objectives: request.learning_objectives,
        content: request.content,
        homework: request.homework,
        timestamp: None,
    };

    let app = state.clone();
    run_blocking(state.request_timeout(), move || app.notes().save_notes(&notes)).await?;
    Ok(ApiOk::message("Lesson notes saved successfully."))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TutorRequest {
    pub question: Option<String>,
    pub lesson_path: Option<String>,
}

/// POST /ai-tutor
pub async fn ai_tutor(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<TutorRequest>,
) -> ApiResult {
    require_fields(&[
        ("question", request.question.as_deref()),
        ("lesson_path", request.lesson_path.as_deref()),
    ])?;

    let app = state.clone();
    let explanation = run_blocking(state.request_timeout(), move || {
        Ok(app.advisor().tutor(
            request.question.as_deref().unwrap_or_default(),
            request.lesson_path.as_deref().unwrap_or_default(),
        ))
    })
    .await?;

    ApiOk::with_data("Tutor response generated", &json!({ "explanation": explanation }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SummaryRequest {
    pub analytics_data: Option<Value>,
    pub bloom_data: Option<Value>,
}

/// POST /generate-summary
pub async fn generate_summary(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<SummaryRequest>,
) -> ApiResult {
    let Some(analytics) = request.analytics_data.filter(|v| !v.is_null()) else {
        return Err(ApiError::bad_request("Missing required fields: analytics_data"));
    };
    let app = state.clone();
    let summary =
        run_blocking(state.request_timeout(), move || Ok(app.advisor().summary(&analytics))).await?;
    ApiOk::with_data("Summary generated", &json!({ "summary": summary }))
}

/// POST /generate-blooms-summary
pub async fn generate_blooms_summary(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<SummaryRequest>,
) -> ApiResult {
    let Some(bloom) = request.bloom_data.filter(|v| !v.is_null()) else {
        return Err(ApiError::bad_request("Missing required fields: bloom_data"));
    };
    let app = state.clone();
    let summary =
        run_blocking(state.request_timeout(), move || Ok(app.advisor().blooms_summary(&bloom))).await?;
    ApiOk::with_data("Taxonomy summary generated", &json!({ "summary": summary }))
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> ApiResult {
    ApiOk::with_data(
        "ok",
        &json!({
            "version": env!("CARGO_PKG_VERSION"),
            "generator": state.generator.name(),
            "classifier": state.classifiers.default_strategy().as_str(),
        }),
    )
}
