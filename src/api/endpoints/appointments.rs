//! Appointment endpoints.
//!
//! - `POST /api/appointments`: schedule an appointment
//! - `GET /api/appointments/:patient_id`: list a patient's appointments

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
pub struct AppointmentRequest {
    pub patient_id: String,
    pub doctor_name: String,
    pub appointment_date: String,
    #[serde(default)]
    pub reason: String,
}

pub async fn create(
    State(ctx): State<ApiContext>,
    ApiJson(req): ApiJson<AppointmentRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    require("doctor_name", &req.doctor_name)?;
    require("appointment_date", &req.appointment_date)?;

    let appointment_id = Uuid::new_v4();
    let payload = json!({
        "appointment_id": appointment_id.to_string(),
        "doctor_name": req.doctor_name,
        "date": req.appointment_date,
        "reason": req.reason,
    });
    create_record(
        &ctx,
        RecordType::Appointment,
        &req.patient_id,
        payload,
        Some(appointment_id),
    )
    .await
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
    Query(params): Query<LimitParams>,
) -> Result<Json<RecordListResponse>, ApiError> {
    list_records(&ctx, RecordType::Appointment, patient_id, &params).await
}
