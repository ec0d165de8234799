//! Lab order endpoints.
//!
//! - `POST /api/labs`: order one or more tests
//! - `GET /api/labs/:patient_id`: list a patient's lab orders

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::records::{create_record, list_records};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, CreatedResponse, LimitParams, RecordListResponse};
use crate::models::RecordType;

const PRIORITIES: &[&str] = &["normal", "urgent", "stat"];

fn default_priority() -> String {
    "normal".to_string()
}

#[derive(Deserialize)]
pub struct LabOrderRequest {
    pub patient_id: String,
    pub test_types: Vec<String>,
    #[serde(default = "default_priority")]
    pub priority: String,
}

pub async fn create(
    State(ctx): State<ApiContext>,
    ApiJson(req): ApiJson<LabOrderRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    if req.test_types.is_empty() || req.test_types.iter().any(|t| t.trim().is_empty()) {
        return Err(ApiError::Validation(
            "test_types must list at least one test".into(),
        ));
    }
    let priority = req.priority.to_lowercase();
    if !PRIORITIES.contains(&priority.as_str()) {
        return Err(ApiError::Validation(format!(
            "priority must be one of: {}",
            PRIORITIES.join(", ")
        )));
    }

    let lab_id = Uuid::new_v4();
    let payload = json!({
        "lab_id": lab_id.to_string(),
        "test_types": req.test_types,
        "priority": priority,
    });
    create_record(&ctx, RecordType::LabOrder, &req.patient_id, payload, Some(lab_id)).await
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
    Query(params): Query<LimitParams>,
) -> Result<Json<RecordListResponse>, ApiError> {
    list_records(&ctx, RecordType::LabOrder, patient_id, &params).await
}
