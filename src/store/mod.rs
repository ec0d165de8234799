//! Encrypted record store.
//!
//! Every payload is serialized to JSON and sealed with AES-256-GCM under a
//! single process-wide `MasterKey` before it reaches SQLite. Each write also
//! appends one audit entry in the same transaction.
//!
//! Operations run on tokio's blocking pool with a short-lived connection
//! each. A semaphore bounds how many connections are open at once, and every
//! operation is wrapped in a timeout.

mod error;
pub mod retry;

pub use error::StoreError;
pub use retry::RetryPolicy;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rusqlite::{Connection, TransactionBehavior};
use serde_json::json;
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::crypto::{self, CryptoError, MasterKey};
use crate::db::{self, repository};
use crate::models::{
    default_access_policy, ActorRole, AuditAction, AuditEntry, AuditStatus, DecryptedRecord,
    EncryptedRecord, RecordType, UnifiedRecords,
};

/// Default page size for `query` when the caller does not pass one.
pub const DEFAULT_QUERY_LIMIT: u32 = 10;

struct StoreInner {
    db_path: PathBuf,
    key: MasterKey,
    permits: Arc<Semaphore>,
    max_connections: u32,
    timeout: Duration,
    retry: RetryPolicy,
    closed: AtomicBool,
}

/// Handle to the encrypted record store. Cheap to clone; all clones share
/// the same key and connection budget.
#[derive(Clone)]
pub struct RecordStore {
    inner: Arc<StoreInner>,
}

impl RecordStore {
    /// Open the store: resolve the key, create the database file and run
    /// migrations, then verify the connection.
    ///
    /// Without a configured key an ephemeral one is generated. Records written
    /// under it cannot be read after a restart.
    pub async fn init(config: &StoreConfig) -> Result<Self, StoreError> {
        let key = match &config.master_key {
            Some(encoded) => MasterKey::from_base64(encoded)
                .map_err(|e| StoreError::Configuration(e.to_string()))?,
            None => {
                let key = MasterKey::generate();
                tracing::warn!(
                    key_id = %key.key_id(),
                    "No master key configured; generated an ephemeral key. \
                     Records stored in this run will be unreadable after restart."
                );
                key
            }
        };
        Self::init_with_key(config, key).await
    }

    /// Open the store with an explicit key.
    pub async fn init_with_key(config: &StoreConfig, key: MasterKey) -> Result<Self, StoreError> {
        if config.max_connections == 0 {
            return Err(StoreError::Configuration(
                "max_connections must be at least 1".into(),
            ));
        }

        let db_path = config.db_path.clone();
        let migrate_path = db_path.clone();
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            if let Some(parent) = migrate_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| StoreError::Storage(e.to_string()))?;
                }
            }
            db::open_database(&migrate_path)?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Storage(format!("initialization task failed: {e}")))??;

        let max_connections = u32::try_from(config.max_connections).unwrap_or(u32::MAX);
        let store = Self {
            inner: Arc::new(StoreInner {
                db_path,
                key,
                permits: Arc::new(Semaphore::new(max_connections as usize)),
                max_connections,
                timeout: config.operation_timeout,
                retry: RetryPolicy::default(),
                closed: AtomicBool::new(false),
            }),
        };

        if !store.check_connection().await {
            return Err(StoreError::Storage("database did not answer a probe query".into()));
        }

        tracing::info!(
            key_id = %store.key_id(),
            max_connections,
            "Record store initialized"
        );
        Ok(store)
    }

    /// Stop accepting operations and wait for in-flight ones to finish.
    pub async fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        // Holding every permit means no operation is still running
        if let Ok(all) = self
            .inner
            .permits
            .acquire_many(self.inner.max_connections)
            .await
        {
            all.forget();
        }
        self.inner.permits.close();
        tracing::info!("Record store closed");
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Fingerprint of the active key.
    pub fn key_id(&self) -> String {
        self.inner.key.key_id()
    }

    /// Encrypt `payload` and persist it for `patient_id`. Returns the new
    /// record id. The record row and its audit entry commit together.
    pub async fn store(
        &self,
        record_type: RecordType,
        payload: serde_json::Value,
        patient_id: &str,
    ) -> Result<Uuid, StoreError> {
        let patient_id = validate_patient_id(patient_id)?;
        if !payload.is_object() {
            return Err(StoreError::Validation(
                "payload must be a key/value object".into(),
            ));
        }

        let record_id = Uuid::new_v4();
        let payload = Arc::new(payload);

        self.execute("store", move |conn, key| {
            let encrypted_data =
                crypto::seal_json(key, &payload).map_err(StoreError::Encryption)?;
            let now = Utc::now();

            let record = EncryptedRecord {
                id: record_id,
                patient_id: patient_id.clone(),
                record_type,
                encrypted_data,
                key_id: key.key_id(),
                access_policy: default_access_policy(),
                created_at: now,
                updated_at: now,
            };
            let entry = AuditEntry {
                patient_id: patient_id.clone(),
                action: AuditAction::Store,
                actor_role: ActorRole::System,
                details: json!({
                    "record_id": record_id.to_string(),
                    "record_type": record_type.as_str(),
                }),
                status: AuditStatus::Success,
                timestamp: now,
            };

            // Take the write lock up front so contention waits on busy_timeout
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            repository::insert_record(&tx, &record)?;
            repository::insert_audit_entry(&tx, &entry)?;
            tx.commit()?;
            Ok(())
        })
        .await?;

        tracing::info!(
            record_id = %record_id,
            record_type = record_type.as_str(),
            "Stored encrypted record"
        );
        Ok(record_id)
    }

    /// Decrypted records for a patient, newest first, at most `limit`.
    pub async fn query(
        &self,
        patient_id: &str,
        record_type: Option<RecordType>,
        limit: u32,
    ) -> Result<Vec<DecryptedRecord>, StoreError> {
        let patient_id = validate_patient_id(patient_id)?;

        let records: Vec<DecryptedRecord> = self
            .execute("query", move |conn, key| {
                let rows = repository::query_records(conn, &patient_id, record_type, limit)?;
                rows.into_iter().map(|row| decrypt_record(key, row)).collect()
            })
            .await?;

        tracing::debug!(
            count = records.len(),
            record_type = record_type.map(|t| t.as_str()).unwrap_or("any"),
            "Retrieved encrypted records"
        );
        Ok(records)
    }

    /// Appointments, labs, prescriptions and billing for one patient.
    ///
    /// The four queries run concurrently; if any of them fails the whole
    /// view fails rather than returning a partial result.
    pub async fn unified_view(&self, patient_id: &str) -> Result<UnifiedRecords, StoreError> {
        let (appointments, labs, prescriptions, billing) = tokio::try_join!(
            self.query(patient_id, Some(RecordType::Appointment), DEFAULT_QUERY_LIMIT),
            self.query(patient_id, Some(RecordType::LabOrder), DEFAULT_QUERY_LIMIT),
            self.query(patient_id, Some(RecordType::Prescription), DEFAULT_QUERY_LIMIT),
            self.query(patient_id, Some(RecordType::Billing), DEFAULT_QUERY_LIMIT),
        )?;

        Ok(UnifiedRecords {
            appointments,
            labs,
            prescriptions,
            billing,
        })
    }

    /// Audit entries for a patient, newest first.
    pub async fn audit_entries(
        &self,
        patient_id: &str,
        limit: u32,
    ) -> Result<Vec<AuditEntry>, StoreError> {
        let patient_id = validate_patient_id(patient_id)?;
        self.execute("audit_entries", move |conn, _key| {
            Ok(repository::query_audit_by_patient(conn, &patient_id, limit)?)
        })
        .await
    }

    /// `true` when the database answers a trivial query.
    pub async fn check_connection(&self) -> bool {
        let probe = self
            .execute_once(|conn, _key| {
                let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
                Ok(one == 1)
            })
            .await;
        match probe {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!(error = %e, "Record store connection check failed");
                false
            }
        }
    }

    async fn execute<T, F>(&self, operation: &'static str, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: Fn(&mut Connection, &MasterKey) -> Result<T, StoreError> + Send + Sync + 'static,
    {
        let op = Arc::new(op);
        let result = retry::with_backoff(operation, &self.inner.retry, || {
            let op = Arc::clone(&op);
            self.execute_once(move |conn, key| op(conn, key))
        })
        .await;

        if let Err(e) = &result {
            tracing::error!(operation, error = %e, "Record store operation failed");
        }
        result
    }

    async fn execute_once<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection, &MasterKey) -> Result<T, StoreError> + Send + 'static,
    {
        if self.is_closed() {
            return Err(StoreError::Closed);
        }
        let permit = Arc::clone(&self.inner.permits)
            .acquire_owned()
            .await
            .map_err(|_| StoreError::Closed)?;

        let inner = Arc::clone(&self.inner);
        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let mut conn = db::connect(&inner.db_path)?;
            op(&mut conn, &inner.key)
        });

        match tokio::time::timeout(self.inner.timeout, task).await {
            Err(_) => Err(StoreError::Timeout(self.inner.timeout)),
            Ok(Err(join_err)) => Err(StoreError::Storage(format!(
                "storage task failed: {join_err}"
            ))),
            Ok(Ok(result)) => result,
        }
    }
}

/// Patient ids are opaque: blank ids are rejected, anything else is kept
/// byte for byte.
fn validate_patient_id(patient_id: &str) -> Result<String, StoreError> {
    if patient_id.trim().is_empty() {
        return Err(StoreError::Validation("patient_id is required".into()));
    }
    Ok(patient_id.to_string())
}

fn decrypt_record(key: &MasterKey, row: EncryptedRecord) -> Result<DecryptedRecord, StoreError> {
    let active_key = key.key_id();
    if row.key_id != active_key {
        return Err(StoreError::Decryption {
            record_id: row.id,
            source: CryptoError::KeyMismatch {
                record_key: row.key_id,
                active_key,
            },
        });
    }

    let data = crypto::open_json(key, &row.encrypted_data).map_err(|source| {
        StoreError::Decryption {
            record_id: row.id,
            source,
        }
    })?;

    Ok(DecryptedRecord {
        id: row.id,
        record_type: row.record_type,
        data,
        created_at: row.created_at,
        access_policy: row.access_policy,
    })
}
