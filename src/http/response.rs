//! Response envelope, error translation and request plumbing.
//!
//! Every response body is `{success, message, timestamp, data?}`.

use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{async_trait, Json};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ErrorClass, LecternError, Result};
use crate::storage::document::format_timestamp;

/// The response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ApiResponse {
    fn new(success: bool, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            success,
            message: message.into(),
            timestamp: format_timestamp(Utc::now()),
            data,
        }
    }
}

/// A successful response.
pub struct ApiOk {
    message: String,
    data: Option<Value>,
}

impl ApiOk {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }

    /// Success with a data payload. A payload that fails to serialize is
    /// reported as an internal error.
    pub fn with_data<T: Serialize>(message: impl Into<String>, data: &T) -> ApiResult {
        let data = serde_json::to_value(data).map_err(LecternError::from)?;
        Ok(Self {
            message: message.into(),
            data: Some(data),
        })
    }
}

impl IntoResponse for ApiOk {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(ApiResponse::new(true, self.message, self.data))).into_response()
    }
}

/// A failed response with its status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub data: Option<Value>,
}

pub type ApiResult = std::result::Result<ApiOk, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            data: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// HTTP status for a component error.
///
/// Classification failures on the interaction path are internal errors;
/// other text-service failures mean the service is unavailable.
pub fn status_for(err: &LecternError) -> StatusCode {
    match (err, err.class()) {
        (LecternError::ClassificationUnavailable { .. }, _) => StatusCode::INTERNAL_SERVER_ERROR,
        (_, ErrorClass::Validation) => StatusCode::BAD_REQUEST,
        (_, ErrorClass::NotFound) => StatusCode::NOT_FOUND,
        (_, ErrorClass::Upstream) => StatusCode::SERVICE_UNAVAILABLE,
        (_, ErrorClass::Persistence) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<LecternError> for ApiError {
    fn from(err: LecternError) -> Self {
        let status = status_for(&err);
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %err, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %err, "request rejected");
        }
        let data = match &err {
            LecternError::MissingVocabulary { missing, .. } => {
                Some(serde_json::json!({ "missing_verbs": missing }))
            }
            _ => None,
        };
        Self {
            status,
            message: err.to_string(),
            data,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::new(false, self.message, self.data))).into_response()
    }
}

/// JSON body extractor whose rejections use the envelope.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::bad_request(format!(
                "Invalid JSON body: {}",
                rejection.body_text()
            ))),
        }
    }
}

/// Reject a request listing every blank or missing required field.
pub fn require_fields(fields: &[(&str, Option<&str>)]) -> std::result::Result<(), ApiError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.map(|v| v.trim().is_empty()).unwrap_or(true))
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// Run blocking core work off the async runtime, bounded by `limit`.
///
/// An elapsed bound answers 503; the work itself runs to completion.
pub async fn run_blocking<T, F>(limit: Duration, work: F) -> std::result::Result<T, ApiError>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(limit, tokio::task::spawn_blocking(work)).await {
        Ok(Ok(result)) => result.map_err(ApiError::from),
        Ok(Err(join_error)) => {
            tracing::error!(error = %join_error, "request worker failed");
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ))
        }
        Err(_) => {
            tracing::warn!(limit_secs = limit.as_secs(), "request timed out");
            Err(ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Request timed out after {}s", limit.as_secs()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&LecternError::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&LecternError::missing_vocabulary("Year 1", vec!["name".into()])),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&LecternError::not_found("session", "s")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&LecternError::classification_unavailable("down")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&LecternError::upstream("text generation", "down")),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&LecternError::persistence("disk full")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_require_fields_lists_missing() {
        let err = require_fields(&[("student_id", Some("s")), ("lesson_ref", None), ("session_id", Some("  "))])
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Missing required fields: lesson_ref, session_id");
        assert!(require_fields(&[("a", Some("b"))]).is_ok());
    }

    #[test]
    fn test_vocabulary_error_carries_missing_verbs() {
        let err = ApiError::from(LecternError::missing_vocabulary("Year 3", vec!["compare".into()]));
        assert_eq!(err.data.unwrap()["missing_verbs"][0], "compare");
    }

    #[tokio::test]
    async fn test_run_blocking_times_out() {
        let err = run_blocking(Duration::from_millis(10), || {
            std::thread::sleep(Duration::from_millis(200));
            Ok(())
        })
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_run_blocking_maps_errors() {
        let err = run_blocking(Duration::from_secs(5), || -> Result<()> {
            Err(LecternError::not_found("lesson", "L"))
        })
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
