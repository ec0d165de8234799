use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::{AccessPolicy, EncryptedRecord, RecordType};

/// Insert one encrypted record. Records are never updated afterwards.
pub fn insert_record(conn: &Connection, record: &EncryptedRecord) -> Result<(), DatabaseError> {
    let policy = serde_json::to_string(&record.access_policy).map_err(|e| {
        DatabaseError::CorruptedColumn {
            column: "access_policy",
            reason: e.to_string(),
        }
    })?;

    conn.execute(
        "INSERT INTO encrypted_records
         (id, patient_id, record_type, encrypted_data, key_id, access_policy, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            record.id.to_string(),
            record.patient_id,
            record.record_type.as_str(),
            record.encrypted_data,
            record.key_id,
            policy,
            format_timestamp(&record.created_at),
            format_timestamp(&record.updated_at),
        ],
    )?;
    Ok(())
}

/// Raw column values, converted after the statement finishes so enum and
/// timestamp parse errors surface as `DatabaseError` rather than rusqlite errors.
struct RecordRow {
    id: String,
    patient_id: String,
    record_type: String,
    encrypted_data: Vec<u8>,
    key_id: String,
    access_policy: String,
    created_at: String,
    updated_at: String,
}

impl RecordRow {
    fn into_record(self) -> Result<EncryptedRecord, DatabaseError> {
        let id = Uuid::parse_str(&self.id).map_err(|e| DatabaseError::CorruptedColumn {
            column: "id",
            reason: e.to_string(),
        })?;
        let access_policy: AccessPolicy =
            serde_json::from_str(&self.access_policy).map_err(|e| {
                DatabaseError::CorruptedColumn {
                    column: "access_policy",
                    reason: e.to_string(),
                }
            })?;

        Ok(EncryptedRecord {
            id,
            patient_id: self.patient_id,
            record_type: RecordType::from_str(&self.record_type)?,
            encrypted_data: self.encrypted_data,
            key_id: self.key_id,
            access_policy,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
        })
    }
}

/// Most recent records for a patient, optionally restricted to one type.
///
/// Ordered by `created_at` descending; rows inserted within the same
/// microsecond fall back to insertion order (newest first).
pub fn query_records(
    conn: &Connection,
    patient_id: &str,
    record_type: Option<RecordType>,
    limit: u32,
) -> Result<Vec<EncryptedRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, record_type, encrypted_data, key_id, access_policy,
                created_at, updated_at
         FROM encrypted_records
         WHERE patient_id = ?1 AND (?2 IS NULL OR record_type = ?2)
         ORDER BY created_at DESC, rowid DESC
         LIMIT ?3",
    )?;

    let rows = stmt
        .query_map(
            params![patient_id, record_type.map(|t| t.as_str()), limit],
            |row| {
                Ok(RecordRow {
                    id: row.get(0)?,
                    patient_id: row.get(1)?,
                    record_type: row.get(2)?,
                    encrypted_data: row.get(3)?,
                    key_id: row.get(4)?,
                    access_policy: row.get(5)?,
                    created_at: row.get(6)?,
                    updated_at: row.get(7)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(RecordRow::into_record).collect()
}
