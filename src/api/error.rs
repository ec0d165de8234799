//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::assistant::AssistantError;
use crate::generation::GenerationError;
use crate::store::StoreError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),
    #[error("Text generation failed: {0}")]
    GenerationFailed(String),
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Backend details are logged here and never sent to the client
        let (status, code, message) = match &self {
            ApiError::Validation(detail) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                detail.clone(),
            ),
            ApiError::StorageUnavailable(detail) => {
                tracing::error!(detail, "Storage failure");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORAGE_UNAVAILABLE",
                    "Record storage is unavailable, try again later".to_string(),
                )
            }
            ApiError::DecryptionFailed(detail) => {
                tracing::error!(detail, "Record decryption failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DECRYPTION_FAILED",
                    "A stored record could not be decrypted".to_string(),
                )
            }
            ApiError::GenerationFailed(detail) => {
                tracing::error!(detail, "Text generation failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_FAILED",
                    "The assistant is unavailable, try again later".to_string(),
                )
            }
            ApiError::Timeout(detail) => {
                tracing::warn!(detail, "Request timed out");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "TIMEOUT",
                    "The operation timed out".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => ApiError::Validation(msg),
            e @ (StoreError::Storage(_) | StoreError::Closed) => {
                ApiError::StorageUnavailable(e.to_string())
            }
            e @ StoreError::Decryption { .. } => ApiError::DecryptionFailed(e.to_string()),
            e @ StoreError::Timeout(_) => ApiError::Timeout(e.to_string()),
            e @ (StoreError::Encryption(_) | StoreError::Configuration(_)) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl From<AssistantError> for ApiError {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::Validation(msg) => ApiError::Validation(msg),
            AssistantError::Store(e) => e.into(),
            e @ (AssistantError::Timeout(_)
            | AssistantError::Generation(GenerationError::Timeout(_))) => {
                ApiError::Timeout(e.to_string())
            }
            AssistantError::Generation(e) => ApiError::GenerationFailed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use std::time::Duration;
    use uuid::Uuid;

    use crate::crypto::CryptoError;

    async fn error_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn validation_returns_400_with_detail() {
        let response = ApiError::Validation("patient_id is required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = error_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
        assert_eq!(json["error"]["message"], "patient_id is required");
    }

    #[tokio::test]
    async fn storage_failure_returns_503_and_hides_detail() {
        let response =
            ApiError::from(StoreError::Storage("database is locked".into())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = error_json(response).await;
        assert_eq!(json["error"]["code"], "STORAGE_UNAVAILABLE");
        assert!(!json["error"]["message"].as_str().unwrap().contains("locked"));
    }

    #[tokio::test]
    async fn decryption_failure_returns_500() {
        let err = StoreError::Decryption {
            record_id: Uuid::nil(),
            source: CryptoError::DecryptionFailed,
        };
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = error_json(response).await;
        assert_eq!(json["error"]["code"], "DECRYPTION_FAILED");
    }

    #[tokio::test]
    async fn generation_failure_returns_502() {
        let err = AssistantError::Generation(GenerationError::Connection(
            "http://localhost:11434".into(),
        ));
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = error_json(response).await;
        assert_eq!(json["error"]["code"], "GENERATION_FAILED");
    }

    #[tokio::test]
    async fn timeouts_return_504() {
        for err in [
            ApiError::from(StoreError::Timeout(Duration::from_secs(10))),
            ApiError::from(AssistantError::Timeout(Duration::from_secs(120))),
            ApiError::from(AssistantError::Generation(GenerationError::Timeout(120))),
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
            let json = error_json(response).await;
            assert_eq!(json["error"]["code"], "TIMEOUT");
        }
    }

    #[tokio::test]
    async fn closed_store_is_storage_unavailable() {
        let response = ApiError::from(StoreError::Closed).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn assistant_store_errors_keep_their_mapping() {
        let err = AssistantError::Store(StoreError::Validation("bad".into()));
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn internal_hides_detail() {
        let response = ApiError::Internal("something broke".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = error_json(response).await;
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }
}
