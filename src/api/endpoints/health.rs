//! Health check endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// `GET /health`, `GET /api/health`: liveness only, touches nothing.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: crate::config::APP_NAME,
        version: crate::config::APP_VERSION,
    })
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub storage: bool,
    pub key_id: String,
    pub model: String,
}

/// `GET /api/health/ready`: verifies the database answers.
pub async fn ready(State(ctx): State<ApiContext>) -> Result<Json<ReadinessResponse>, ApiError> {
    if !ctx.store.check_connection().await {
        return Err(ApiError::StorageUnavailable(
            "readiness probe could not reach the database".into(),
        ));
    }

    Ok(Json(ReadinessResponse {
        status: "ready",
        storage: true,
        key_id: ctx.store.key_id(),
        model: ctx.assistant.model().to_string(),
    }))
}
