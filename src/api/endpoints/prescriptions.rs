//! Prescription endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::records::{create_record, list_records, require};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, CreatedResponse, LimitParams, RecordListResponse};
use crate::models::RecordType;

#[derive(Deserialize)]
pub struct PrescriptionRequest {
    pub patient_id: String,
    pub medication: String,
    #[serde(default)]
    pub dosage: Option<String>,
}

/// `POST /api/prescriptions`
pub async fn create(
    State(ctx): State<ApiContext>,
    ApiJson(req): ApiJson<PrescriptionRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    require("medication", &req.medication)?;

    let prescription_id = Uuid::new_v4();
    let payload = json!({
        "prescription_id": prescription_id.to_string(),
        "medication": req.medication,
        "dosage": req.dosage,
    });
    create_record(
        &ctx,
        RecordType::Prescription,
        &req.patient_id,
        payload,
        Some(prescription_id),
    )
    .await
}

/// `GET /api/prescriptions/:patient_id`
pub async fn list(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
    Query(params): Query<LimitParams>,
) -> Result<Json<RecordListResponse>, ApiError> {
    list_records(&ctx, RecordType::Prescription, patient_id, &params).await
}
