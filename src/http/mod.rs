//! HTTP server module

mod lessons;
mod reports;
pub mod response;
mod sessions;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

pub use response::{status_for, ApiError, ApiOk, ApiResponse, ApiResult};
pub use state::{AppState, SharedStore};

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(reports::health))
        .route("/initialize-lesson", post(sessions::initialize_lesson))
        .route("/pause-lesson", post(sessions::pause_lesson))
        .route("/resume-lesson", post(sessions::resume_lesson))
        .route("/process-interaction", post(sessions::process_interaction))
        .route("/save-progress", post(sessions::save_progress))
        .route("/complete-section", post(sessions::complete_section))
        .route("/lesson-content", post(lessons::lesson_content))
        .route("/get-sample-lesson-ref", get(lessons::sample_lesson_ref))
        .route("/lessons", post(lessons::create_lesson))
        .route("/generate-lesson-plan", post(lessons::generate_lesson_plan))
        .route("/generate-final-report", post(reports::generate_final_report))
        .route("/generate-lesson-notes", post(reports::generate_lesson_notes))
        .route("/save-lesson-notes", post(reports::save_lesson_notes))
        .route("/ai-tutor", post(reports::ai_tutor))
        .route("/generate-summary", post(reports::generate_summary))
        .route("/generate-blooms-summary", post(reports::generate_blooms_summary))
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use super::testing::{app, server};
    use crate::generation::testing::ScriptedGenerator;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_router_has_health_endpoint() {
        let server = server(app(ScriptedGenerator::always("x")));
        server.get("/health").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let server = server(app(ScriptedGenerator::always("x")));
        let response = server.get("/nope").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }
}
