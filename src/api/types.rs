//! Shared types for the HTTP API layer.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::assistant::MedicalAssistant;
use crate::models::DecryptedRecord;
use crate::store::{RecordStore, DEFAULT_QUERY_LIMIT};

/// Upper bound for `?limit=` on list endpoints.
pub const MAX_PAGE_LIMIT: u32 = 100;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub store: RecordStore,
    pub assistant: Arc<MedicalAssistant>,
}

impl ApiContext {
    pub fn new(store: RecordStore, assistant: Arc<MedicalAssistant>) -> Self {
        Self { store, assistant }
    }
}

// ═══════════════════════════════════════════════════════════
// Request helpers
// ═══════════════════════════════════════════════════════════

/// JSON body extractor whose rejections use the API error shape.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = axum::extract::rejection::JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// `?limit=` query parameter for list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<u32>,
}

impl LimitParams {
    pub fn resolve(&self) -> Result<u32, ApiError> {
        match self.limit {
            None => Ok(DEFAULT_QUERY_LIMIT),
            Some(0) => Err(ApiError::Validation("limit must be at least 1".into())),
            Some(n) => Ok(n.min(MAX_PAGE_LIMIT)),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Response shapes
// ═══════════════════════════════════════════════════════════

/// Response for every record-creating endpoint.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub status: &'static str,
    pub record_id: Uuid,
    /// Domain id generated inside the payload (`appointment_id`, `lab_id`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<Uuid>,
    pub encrypted: bool,
}

impl CreatedResponse {
    pub fn new(record_id: Uuid, resource_id: Option<Uuid>) -> Self {
        Self {
            status: "success",
            record_id,
            resource_id,
            encrypted: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordListResponse {
    pub status: &'static str,
    pub patient_id: String,
    pub count: usize,
    pub records: Vec<DecryptedRecord>,
}

impl RecordListResponse {
    pub fn new(patient_id: String, records: Vec<DecryptedRecord>) -> Self {
        Self {
            status: "success",
            patient_id,
            count: records.len(),
            records,
        }
    }
}
