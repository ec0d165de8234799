pub mod keys;
pub mod encryption;
mod phi_audit;

pub use keys::*;
pub use encryption::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed: wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Record was encrypted under key {record_key}, active key is {active_key}")]
    KeyMismatch {
        record_key: String,
        active_key: String,
    },

    #[error("Ciphertext too short or malformed")]
    MalformedCiphertext,

    #[error("Invalid master key: {0}")]
    InvalidKey(String),
}
