use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::RecordType;

/// Role name → grant. Persisted with every record, not enforced.
pub type AccessPolicy = BTreeMap<String, bool>;

pub fn default_access_policy() -> AccessPolicy {
    BTreeMap::from([("doctor".to_string(), true), ("patient".to_string(), true)])
}

/// A row of `encrypted_records` as stored. Payload is opaque ciphertext.
#[derive(Debug, Clone)]
pub struct EncryptedRecord {
    pub id: Uuid,
    pub patient_id: String,
    pub record_type: RecordType,
    pub encrypted_data: Vec<u8>,
    pub key_id: String,
    pub access_policy: AccessPolicy,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A record after decryption, as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecryptedRecord {
    pub id: Uuid,
    pub record_type: RecordType,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub access_policy: AccessPolicy,
}

/// All of a patient's records grouped by the four clinical types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnifiedRecords {
    pub appointments: Vec<DecryptedRecord>,
    pub labs: Vec<DecryptedRecord>,
    pub prescriptions: Vec<DecryptedRecord>,
    pub billing: Vec<DecryptedRecord>,
}
