//! Session lifecycle and interaction endpoints.

use std::sync::Arc;

use axum::extract::State;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::config::{ClassifierStrategy, VALID_CLASSIFIER_STRATEGIES};
use crate::content::{adjust_difficulty, StudentHistory};
use crate::core::{InteractionInput, LessonPath, TimeOnTask};
use crate::http::response::{require_fields, run_blocking, ApiError, ApiOk, ApiResult, JsonBody};
use crate::http::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InitializeLessonRequest {
    pub student_id: Option<String>,
    pub lesson_ref: Option<String>,
    pub country: Option<String>,
    pub curriculum: Option<String>,
    pub grade: Option<String>,
    pub level: Option<String>,
    pub subject: Option<String>,
    #[serde(rename = "learningObjectives")]
    pub learning_objectives: Vec<String>,
    /// When present, the lesson is adapted to this history before the
    /// session starts.
    pub student_history: Option<StudentHistory>,
}

/// Fields naming a lesson by its curriculum path.
pub(crate) fn lesson_path_from(
    lesson_ref: &Option<String>,
    country: &Option<String>,
    curriculum: &Option<String>,
    grade: &Option<String>,
    level: &Option<String>,
    subject: &Option<String>,
) -> std::result::Result<LessonPath, ApiError> {
    require_fields(&[
        ("lesson_ref", lesson_ref.as_deref()),
        ("country", country.as_deref()),
        ("curriculum", curriculum.as_deref()),
        ("grade", grade.as_deref()),
        ("level", level.as_deref()),
        ("subject", subject.as_deref()),
    ])?;
    let text = |value: &Option<String>| value.as_deref().unwrap_or_default().trim().to_string();
    Ok(LessonPath::new(
        text(country),
        text(curriculum),
        text(grade),
        text(level),
        text(subject),
        text(lesson_ref),
    ))
}

/// POST /initialize-lesson
pub async fn initialize_lesson(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<InitializeLessonRequest>,
) -> ApiResult {
    require_fields(&[("student_id", request.student_id.as_deref())])?;
    let path = lesson_path_from(
        &request.lesson_ref,
        &request.country,
        &request.curriculum,
        &request.grade,
        &request.level,
        &request.subject,
    )?;
    let student_id = request.student_id.unwrap_or_default();
    let objectives = request.learning_objectives;
    let history = request.student_history;

    let app = state.clone();
    let started = run_blocking(state.request_timeout(), move || {
        let sessions = app.sessions();
        let mut found = sessions.find_lesson(&path)?;
        // Requested objectives fill in for lessons authored without any.
        if let Some(obj) = found.data.as_object_mut() {
            let authored = obj.contains_key("objectives") || obj.contains_key("learningObjectives");
            if !authored && !objectives.is_empty() {
                obj.insert("objectives".into(), json!(objectives));
            }
        }

        let mut lesson = app.enhancer().enhance(&path.subject, &found.data);
        if let Some(history) = history {
            adjust_difficulty(&mut lesson, history, &app.simplifier());
        }
        sessions.start_session(&student_id, &path.lesson_ref, &found.path, lesson)
    })
    .await?;

    ApiOk::with_data(
        "Lesson initialized successfully",
        &json!({
            "session_id": started.session_id,
            "lessonData": started.lesson,
            "state": started.state,
        }),
    )
}

/// Parse a client timestamp. Offset-free ISO-8601 values are taken as UTC.
fn client_timestamp(raw: Option<&str>) -> std::result::Result<Option<DateTime<Utc>>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(at.with_timezone(&Utc)));
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| Some(naive.and_utc()))
        .map_err(|_| ApiError::bad_request(format!("Invalid timestamp: {}", raw)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PauseLessonRequest {
    pub session_id: Option<String>,
    pub timestamp: Option<String>,
    pub reason: Option<String>,
}

/// POST /pause-lesson
pub async fn pause_lesson(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<PauseLessonRequest>,
) -> ApiResult {
    require_fields(&[("session_id", request.session_id.as_deref())])?;
    let at = client_timestamp(request.timestamp.as_deref())?;
    let app = state.clone();
    run_blocking(state.request_timeout(), move || {
        app.sessions().pause(
            request.session_id.as_deref().unwrap_or_default(),
            at,
            request.reason.as_deref(),
        )
    })
    .await?;
    Ok(ApiOk::message("Lesson paused successfully"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResumeLessonRequest {
    pub session_id: Option<String>,
    pub timestamp: Option<String>,
}

/// POST /resume-lesson
pub async fn resume_lesson(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<ResumeLessonRequest>,
) -> ApiResult {
    require_fields(&[("session_id", request.session_id.as_deref())])?;
    let at = client_timestamp(request.timestamp.as_deref())?;
    let app = state.clone();
    run_blocking(state.request_timeout(), move || {
        app.sessions()
            .resume(request.session_id.as_deref().unwrap_or_default(), at)
    })
    .await?;
    Ok(ApiOk::message("Lesson resumed successfully"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProcessInteractionRequest {
    pub student_id: Option<String>,
    pub lesson_ref: Option<String>,
    pub session_id: Option<String>,
    pub interaction_data: InteractionInput,
    /// Per-call classifier strategy; the configured default otherwise.
    pub classifier: Option<String>,
}

/// POST /process-interaction
///
/// Projects the new time on task, aggregates the interaction, then commits
/// the lesson state. A classification failure leaves both untouched.
pub async fn process_interaction(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<ProcessInteractionRequest>,
) -> ApiResult {
    require_fields(&[
        ("student_id", request.student_id.as_deref()),
        ("lesson_ref", request.lesson_ref.as_deref()),
        ("session_id", request.session_id.as_deref()),
    ])?;
    let strategy = match request.classifier.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(name) => Some(ClassifierStrategy::parse(name).ok_or_else(|| {
            ApiError::bad_request(format!(
                "Unknown classifier '{}'. Valid: {}",
                name,
                VALID_CLASSIFIER_STRATEGIES.join(", ")
            ))
        })?),
    };

    let app = state.clone();
    let analysis = run_blocking(state.request_timeout(), move || {
        let student_id = request.student_id.unwrap_or_default();
        let lesson_ref = request.lesson_ref.unwrap_or_default();
        let session_id = request.session_id.unwrap_or_default();
        let interaction = request.interaction_data;

        let sessions = app.sessions();
        let projected = sessions.project_time(&session_id, interaction.duration)?;
        let time = TimeOnTask {
            time_spent: projected.time_spent,
            total_duration: projected.total_duration,
        };
        let classifier = app.classifiers.select(strategy);
        let analysis = app.aggregator().record_interaction(
            &student_id,
            &lesson_ref,
            interaction,
            time,
            classifier.as_ref(),
        )?;
        sessions.commit_state(&projected)?;
        Ok(analysis)
    })
    .await?;

    ApiOk::with_data("Interaction processed successfully", &analysis)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SaveProgressRequest {
    pub session_id: Option<String>,
    pub user_id: Option<String>,
    pub lesson_ref: Option<String>,
    pub progress: Option<f64>,
}

/// POST /save-progress
pub async fn save_progress(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<SaveProgressRequest>,
) -> ApiResult {
    require_fields(&[
        ("session_id", request.session_id.as_deref()),
        ("user_id", request.user_id.as_deref()),
        ("lesson_ref", request.lesson_ref.as_deref()),
    ])?;
    let Some(progress) = request.progress else {
        return Err(ApiError::bad_request("Missing required fields: progress"));
    };

    let app = state.clone();
    let snapshot = run_blocking(state.request_timeout(), move || {
        app.sessions().save_progress(
            request.session_id.as_deref().unwrap_or_default(),
            request.user_id.as_deref().unwrap_or_default(),
            request.lesson_ref.as_deref().unwrap_or_default(),
            progress,
        )
    })
    .await?;
    ApiOk::with_data("Progress saved successfully", &snapshot)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CompleteSectionRequest {
    pub session_id: Option<String>,
    pub section_index: Option<usize>,
}

/// POST /complete-section
pub async fn complete_section(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<CompleteSectionRequest>,
) -> ApiResult {
    require_fields(&[("session_id", request.session_id.as_deref())])?;
    let Some(index) = request.section_index else {
        return Err(ApiError::bad_request("Missing required fields: section_index"));
    };

    let app = state.clone();
    let result = run_blocking(state.request_timeout(), move || {
        app.sessions()
            .complete_section(request.session_id.as_deref().unwrap_or_default(), index)
    })
    .await?;
    ApiOk::with_data("Section completed", &result)
}
