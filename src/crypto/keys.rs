use base64::Engine;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use super::CryptoError;
use super::encryption::EncryptedData;

pub const KEY_LENGTH: usize = 32; // AES-256
const KEY_ID_HEX_CHARS: usize = 16;

/// Process-wide record encryption key: zeroed on drop
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    key_bytes: [u8; KEY_LENGTH],
}

impl MasterKey {
    /// Generate a fresh random key.
    ///
    /// A generated key lives only as long as the process unless it is
    /// exported with `to_base64` and fed back through configuration.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut key_bytes = [0u8; KEY_LENGTH];
        rand::thread_rng().fill_bytes(&mut key_bytes);
        Self { key_bytes }
    }

    pub fn from_bytes(key_bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key_bytes }
    }

    /// Decode a standard base64 key (32 bytes once decoded).
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let mut decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

        if decoded.len() != KEY_LENGTH {
            let len = decoded.len();
            decoded.zeroize();
            return Err(CryptoError::InvalidKey(format!(
                "expected {KEY_LENGTH} bytes, got {len}"
            )));
        }

        let mut key_bytes = [0u8; KEY_LENGTH];
        key_bytes.copy_from_slice(&decoded);
        decoded.zeroize();
        Ok(Self { key_bytes })
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.key_bytes)
    }

    /// Short public fingerprint of the key (hex of the SHA-256 prefix).
    /// Stored next to each record so a key change is detectable on read.
    pub fn key_id(&self) -> String {
        let digest = Sha256::digest(self.key_bytes);
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        hex[..KEY_ID_HEX_CHARS].to_string()
    }

    /// Encrypt data using AES-256-GCM
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedData, CryptoError> {
        EncryptedData::encrypt(&self.key_bytes, plaintext)
    }

    /// Decrypt data using AES-256-GCM
    pub fn decrypt(&self, encrypted: &EncryptedData) -> Result<Vec<u8>, CryptoError> {
        encrypted.decrypt(&self.key_bytes)
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("key_id", &self.key_id())
            .finish()
    }
}
