use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::export::ExportError;
use crate::storage::StorageError;
use crate::suggestions::SuggestionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Suggestion error: {0}")]
    Suggestion(#[from] SuggestionError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Export(e) => export_error_parts(e),
            AppError::Suggestion(e) => suggestion_error_parts(e),
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

fn export_error_parts(e: &ExportError) -> (StatusCode, &'static str, String) {
    match e {
        ExportError::Busy => (StatusCode::CONFLICT, "EXPORT_BUSY", e.to_string()),
        ExportError::NoPages => (StatusCode::BAD_REQUEST, "NO_PAGES", e.to_string()),
        ExportError::Rasterize(_)
        | ExportError::Pdf(_)
        | ExportError::Font(_)
        | ExportError::Io(_) => {
            tracing::error!("Export failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "EXPORT_FAILED",
                "Failed to generate PDF. Please try again.".to_string(),
            )
        }
    }
}

fn suggestion_error_parts(e: &SuggestionError) -> (StatusCode, &'static str, String) {
    let status = match e {
        SuggestionError::CredentialMissing | SuggestionError::JobDescriptionMissing => {
            StatusCode::BAD_REQUEST
        }
        SuggestionError::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
        SuggestionError::SafetyBlocked(_) | SuggestionError::NothingToApply(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SuggestionError::NoSuggestions => StatusCode::NOT_FOUND,
        SuggestionError::Http { .. }
        | SuggestionError::EmptyResponse
        | SuggestionError::MalformedResponse(_)
        | SuggestionError::Transport(_) => {
            tracing::warn!("Suggestion request failed: {e:?}");
            StatusCode::BAD_GATEWAY
        }
    };
    (status, e.code(), e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_body() {
        let response = AppError::Validation("bad list".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "bad list");
    }

    #[tokio::test]
    async fn test_export_busy_is_conflict() {
        let response = AppError::from(ExportError::Busy).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["error"]["code"], "EXPORT_BUSY");
    }

    #[test]
    fn test_suggestion_errors_have_distinct_codes() {
        let errors = [
            SuggestionError::CredentialMissing,
            SuggestionError::JobDescriptionMissing,
            SuggestionError::QuotaExceeded,
            SuggestionError::Http {
                status: 400,
                message: "bad".to_string(),
            },
            SuggestionError::SafetyBlocked("SAFETY".to_string()),
            SuggestionError::EmptyResponse,
            SuggestionError::MalformedResponse("x".to_string()),
            SuggestionError::Transport("x".to_string()),
        ];
        let mut codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[tokio::test]
    async fn test_safety_block_message_names_reason() {
        let response =
            AppError::from(SuggestionError::SafetyBlocked("SAFETY".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "AI_SAFETY_BLOCKED");
        assert_eq!(body["error"]["message"], "AI Safety Block: SAFETY");
    }
}
