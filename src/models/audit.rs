use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{ActorRole, AuditAction, AuditStatus};

/// One append-only row of `audit_trail`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub patient_id: String,
    pub action: AuditAction,
    pub actor_role: ActorRole,
    pub details: serde_json::Value,
    pub status: AuditStatus,
    pub timestamp: DateTime<Utc>,
}
