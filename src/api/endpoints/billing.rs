//! Billing endpoints.
//!
//! - `POST /api/billing`: record a billed service
//! - `GET /api/billing/:patient_id`: list a patient's billing records

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
pub struct BillingRequest {
    pub patient_id: String,
    pub service_date: String,
    pub amount: f64,
    pub service_description: String,
}

pub async fn create(
    State(ctx): State<ApiContext>,
    ApiJson(req): ApiJson<BillingRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    require("service_date", &req.service_date)?;
    require("service_description", &req.service_description)?;
    if !req.amount.is_finite() || req.amount < 0.0 {
        return Err(ApiError::Validation(
            "amount must be a non-negative number".into(),
        ));
    }

    let billing_id = Uuid::new_v4();
    let payload = json!({
        "billing_id": billing_id.to_string(),
        "amount": req.amount,
        "service_date": req.service_date,
        "service_description": req.service_description,
    });
    create_record(&ctx, RecordType::Billing, &req.patient_id, payload, Some(billing_id)).await
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
    Query(params): Query<LimitParams>,
) -> Result<Json<RecordListResponse>, ApiError> {
    list_records(&ctx, RecordType::Billing, patient_id, &params).await
}
