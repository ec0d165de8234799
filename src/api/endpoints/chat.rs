//! Assistant endpoints.
//!
//! - `POST /api/chat`: ask the assistant a question
//! - `POST /api/discharge-summary`: generate and store a discharge summary

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson};
use crate::assistant::{ChatReply, DischargeSummary};

const MAX_MESSAGE_CHARS: usize = 2000;
const MAX_VISIT_DETAILS_CHARS: usize = 10_000;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub patient_id: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub reply: ChatReply,
    pub encrypted: bool,
}

/// `POST /api/chat`: context-aware answer; the exchange is stored
/// encrypted before the response is returned.
pub async fn send(
    State(ctx): State<ApiContext>,
    ApiJson(req): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if req.message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::Validation(format!(
            "message too long (max {MAX_MESSAGE_CHARS} chars)"
        )));
    }

    let reply = ctx.assistant.chat(&req.patient_id, &req.message).await?;
    Ok(Json(ChatResponse {
        status: "success",
        reply,
        encrypted: true,
    }))
}

#[derive(Deserialize)]
pub struct DischargeRequest {
    pub patient_id: String,
    pub visit_details: String,
}

#[derive(Serialize)]
pub struct DischargeResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub summary: DischargeSummary,
    pub encrypted: bool,
}

pub async fn discharge_summary(
    State(ctx): State<ApiContext>,
    ApiJson(req): ApiJson<DischargeRequest>,
) -> Result<Json<DischargeResponse>, ApiError> {
    if req.visit_details.chars().count() > MAX_VISIT_DETAILS_CHARS {
        return Err(ApiError::Validation(format!(
            "visit_details too long (max {MAX_VISIT_DETAILS_CHARS} chars)"
        )));
    }

    let summary = ctx
        .assistant
        .discharge_summary(&req.patient_id, &req.visit_details)
        .await?;
    Ok(Json(DischargeResponse {
        status: "success",
        summary,
        encrypted: true,
    }))
}
