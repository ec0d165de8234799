use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::crypto::CryptoError;
use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Cannot decrypt record {record_id}: {source}")]
    Decryption {
        record_id: Uuid,
        #[source]
        source: CryptoError,
    },

    #[error("Storage operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Encryption failed: {0}")]
    Encryption(#[source] CryptoError),

    #[error("Record store is closed")]
    Closed,

    #[error("Invalid store configuration: {0}")]
    Configuration(String),
}

impl StoreError {
    /// Only backend failures are worth another attempt. A wrong key stays
    /// wrong, and a timed-out write may still have committed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Storage(_))
    }
}

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        StoreError::Storage(err.to_string())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}
