//! Shared record handlers.
//!
//! - `GET /api/records/:patient_id`: unified view across record kinds
//!
//! The per-kind endpoint modules delegate to `create_record` and
//! `list_records` so every kind stores and lists the same way.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CreatedResponse, LimitParams, RecordListResponse};
use crate::models::{RecordType, UnifiedRecords};

pub(crate) async fn create_record(
    ctx: &ApiContext,
    record_type: RecordType,
    patient_id: &str,
    payload: serde_json::Value,
    resource_id: Option<Uuid>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let record_id = ctx.store.store(record_type, payload, patient_id).await?;
    Ok(Json(CreatedResponse::new(record_id, resource_id)))
}

pub(crate) async fn list_records(
    ctx: &ApiContext,
    record_type: RecordType,
    patient_id: String,
    params: &LimitParams,
) -> Result<Json<RecordListResponse>, ApiError> {
    let limit = params.resolve()?;
    let records = ctx
        .store
        .query(&patient_id, Some(record_type), limit)
        .await?;
    Ok(Json(RecordListResponse::new(patient_id, records)))
}

/// Reject blank required text fields with a field-specific message.
pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    Ok(())
}

#[derive(Serialize)]
pub struct UnifiedResponse {
    pub status: &'static str,
    pub patient_id: String,
    pub records: UnifiedRecords,
    pub encrypted: bool,
}

/// `GET /api/records/:patient_id`: appointments, labs, prescriptions and
/// billing in one response.
pub async fn unified(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<UnifiedResponse>, ApiError> {
    let records = ctx.store.unified_view(&patient_id).await?;
    Ok(Json(UnifiedResponse {
        status: "success",
        patient_id,
        records,
        encrypted: true,
    }))
}
