use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::gemini_client::GeminiError;
use crate::generation::upload::UploadError;
use crate::instruction::PromptError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Content blocked: {0}")]
    ContentBlocked(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PromptError> for AppError {
    fn from(e: PromptError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::Reencode { .. } => AppError::Internal(anyhow::Error::new(e)),
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl From<GeminiError> for AppError {
    fn from(e: GeminiError) -> Self {
        match e {
            GeminiError::ContentBlocked(msg) => AppError::ContentBlocked(msg),
            other => AppError::Generation(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::ContentBlocked(msg) => {
                tracing::warn!("Generation blocked by safety filter: {msg}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "CONTENT_BLOCKED",
                    "The image model refused this request. Try another photo or scene."
                        .to_string(),
                )
            }
            AppError::Generation(msg) => {
                tracing::error!("Generation error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_ERROR",
                    "The image model failed to produce a photo".to_string(),
                )
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::mode::Mode;

    #[test]
    fn test_prompt_errors_are_validation() {
        let err: AppError = PromptError::InvalidMode("x".into()).into();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("invalid mode 'x'")));

        let err: AppError = PromptError::InvalidImageCount {
            mode: Mode::Conjunto,
            count: 1,
            min: 2,
            max: 3,
        }
        .into();
        assert!(
            matches!(err, AppError::Validation(msg) if msg == "mode conjunto accepts 2 to 3 images, got 1")
        );
    }

    #[test]
    fn test_upload_errors_split_on_server_fault() {
        let corrupt: AppError = UploadError::Corrupt {
            name: "a.png".into(),
            reason: "unexpected EOF".into(),
        }
        .into();
        assert!(matches!(corrupt, AppError::Validation(_)));

        let reencode: AppError = UploadError::Reencode {
            name: "a.png".into(),
            reason: "io".into(),
        }
        .into();
        assert!(matches!(reencode, AppError::Internal(_)));
    }

    #[test]
    fn test_gemini_errors_split_on_content_block() {
        let blocked: AppError = GeminiError::ContentBlocked("SAFETY".into()).into();
        assert!(matches!(blocked, AppError::ContentBlocked(_)));

        let api: AppError = GeminiError::Api {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert!(matches!(api, AppError::Generation(_)));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("bad".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Generation("x".into()).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("x")).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
