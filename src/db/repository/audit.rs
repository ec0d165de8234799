use std::str::FromStr;

use rusqlite::{params, Connection};

use super::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::{ActorRole, AuditAction, AuditEntry, AuditStatus};

/// Append one entry to the audit trail.
pub fn insert_audit_entry(conn: &Connection, entry: &AuditEntry) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO audit_trail (patient_id, action, user_role, details, status, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            entry.patient_id,
            entry.action.as_str(),
            entry.actor_role.as_str(),
            entry.details.to_string(),
            entry.status.as_str(),
            format_timestamp(&entry.timestamp),
        ],
    )?;
    Ok(())
}

/// Audit entries for a patient, newest first.
pub fn query_audit_by_patient(
    conn: &Connection,
    patient_id: &str,
    limit: u32,
) -> Result<Vec<AuditEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT patient_id, action, user_role, details, status, timestamp FROM audit_trail
         WHERE patient_id = ?1
         ORDER BY timestamp DESC, id DESC
         LIMIT ?2",
    )?;
    let rows = stmt
        .query_map(params![patient_id, limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(patient_id, action, role, details, status, timestamp)| -> Result<AuditEntry, DatabaseError> {
            Ok(AuditEntry {
                patient_id,
                action: AuditAction::from_str(&action)?,
                actor_role: ActorRole::from_str(&role)?,
                details: serde_json::from_str(&details).map_err(|e| {
                    DatabaseError::CorruptedColumn {
                        column: "details",
                        reason: e.to_string(),
                    }
                })?,
                status: AuditStatus::from_str(&status)?,
                timestamp: parse_timestamp("timestamp", &timestamp)?,
            })
        })
        .collect()
}

/// Count audit entries for a patient.
#[cfg(test)]
pub fn count_audit_entries(conn: &Connection, patient_id: &str) -> Result<u64, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM audit_trail WHERE patient_id = ?1",
        params![patient_id],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}
