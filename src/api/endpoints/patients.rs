//! Patient demographic records.
//!
//! Stored as `patient_info` records like any other kind, so identifying
//! fields (including SSN) are encrypted with the rest of the payload.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::records::{create_record, list_records, require};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, CreatedResponse, LimitParams, RecordListResponse};
use crate::models::RecordType;

#[derive(Deserialize)]
pub struct PatientInfoRequest {
    pub patient_id: String,
    pub name: String,
    pub date_of_birth: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub ssn: Option<String>,
}

/// `POST /api/patients`
pub async fn create(
    State(ctx): State<ApiContext>,
    ApiJson(req): ApiJson<PatientInfoRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    require("name", &req.name)?;
    require("date_of_birth", &req.date_of_birth)?;

    let payload = json!({
        "name": req.name,
        "date_of_birth": req.date_of_birth,
        "email": req.email,
        "phone": req.phone,
        "address": req.address,
        "ssn": req.ssn,
    });
    create_record(&ctx, RecordType::PatientInfo, &req.patient_id, payload, None).await
}

/// `GET /api/patients/:patient_id`: newest first, so `records[0]` is current.
pub async fn get(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
    Query(params): Query<LimitParams>,
) -> Result<Json<RecordListResponse>, ApiError> {
    list_records(&ctx, RecordType::PatientInfo, patient_id, &params).await
}
