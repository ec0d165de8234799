//! `GET /api/audit/:patient_id`: a patient's audit trail, newest first.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, LimitParams};
use crate::models::AuditEntry;

#[derive(Serialize)]
pub struct AuditResponse {
    pub status: &'static str,
    pub patient_id: String,
    pub entries: Vec<AuditEntry>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
    Query(params): Query<LimitParams>,
) -> Result<Json<AuditResponse>, ApiError> {
    let limit = params.resolve()?;
    let entries = ctx.store.audit_entries(&patient_id, limit).await?;
    Ok(Json(AuditResponse {
        status: "success",
        patient_id,
        entries,
    }))
}
