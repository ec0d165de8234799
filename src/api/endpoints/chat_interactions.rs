//! Chat transcript endpoints.
//!
//! `POST /api/chat-interactions` stores an exchange produced elsewhere;
//! exchanges from `POST /api/chat` are stored by the assistant itself.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::records::{create_record, list_records, require};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, CreatedResponse, LimitParams, RecordListResponse};
use crate::models::RecordType;

#[derive(Deserialize)]
pub struct ChatInteractionRequest {
    pub patient_id: String,
    pub query: String,
    pub response: String,
    #[serde(default)]
    pub model: Option<String>,
}

pub async fn create(
    State(ctx): State<ApiContext>,
    ApiJson(req): ApiJson<ChatInteractionRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    require("query", &req.query)?;

    let payload = json!({
        "query": req.query,
        "response": req.response,
        "timestamp": Utc::now().to_rfc3339(),
        "model": req.model,
    });
    create_record(&ctx, RecordType::ChatInteraction, &req.patient_id, payload, None).await
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
    Query(params): Query<LimitParams>,
) -> Result<Json<RecordListResponse>, ApiError> {
    list_records(&ctx, RecordType::ChatInteraction, patient_id, &params).await
}
