use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};

use super::CryptoError;
use super::keys::KEY_LENGTH;

const NONCE_LENGTH: usize = 12;
const TAG_LENGTH: usize = 16;

/// Encrypted data container: nonce + ciphertext (includes AES-GCM auth tag)
#[derive(Debug, Clone)]
pub struct EncryptedData {
    pub nonce: [u8; NONCE_LENGTH],
    pub ciphertext: Vec<u8>,
}

impl EncryptedData {
    /// Encrypt plaintext using AES-256-GCM with a random nonce
    pub(crate) fn encrypt(key_bytes: &[u8; KEY_LENGTH], plaintext: &[u8]) -> Result<Self, CryptoError> {
        let key = Key::<Aes256Gcm>::from_slice(key_bytes);
        let cipher = Aes256Gcm::new(key);

        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CryptoError::EncryptionFailed)?;

        Ok(Self {
            nonce: nonce_bytes,
            ciphertext,
        })
    }

    /// Decrypt ciphertext using AES-256-GCM
    pub(crate) fn decrypt(&self, key_bytes: &[u8; KEY_LENGTH]) -> Result<Vec<u8>, CryptoError> {
        let key = Key::<Aes256Gcm>::from_slice(key_bytes);
        let cipher = Aes256Gcm::new(key);
        let nonce = Nonce::from_slice(&self.nonce);

        cipher
            .decrypt(nonce, self.ciphertext.as_ref())
            .map_err(|_| CryptoError::DecryptionFailed)
    }

    /// Serialize to bytes: [12-byte nonce][ciphertext...]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(NONCE_LENGTH + self.ciphertext.len());
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Deserialize from bytes: [12-byte nonce][ciphertext...]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(CryptoError::MalformedCiphertext);
        }

        let mut nonce = [0u8; NONCE_LENGTH];
        nonce.copy_from_slice(&bytes[..NONCE_LENGTH]);
        let ciphertext = bytes[NONCE_LENGTH..].to_vec();

        Ok(Self { nonce, ciphertext })
    }
}

/// Encrypt a JSON payload into the stored blob layout.
pub fn seal_json(key: &super::MasterKey, payload: &serde_json::Value) -> Result<Vec<u8>, CryptoError> {
    // serde_json::Value maps are BTreeMap-backed, so key order is canonical
    let plaintext = serde_json::to_vec(payload).map_err(|_| CryptoError::EncryptionFailed)?;
    Ok(key.encrypt(&plaintext)?.to_bytes())
}

/// Decrypt a stored blob back into its JSON payload.
pub fn open_json(key: &super::MasterKey, blob: &[u8]) -> Result<serde_json::Value, CryptoError> {
    let encrypted = EncryptedData::from_bytes(blob)?;
    let plaintext = key.decrypt(&encrypted)?;
    serde_json::from_slice(&plaintext).map_err(|_| CryptoError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::MasterKey;
    use serde_json::json;

    fn test_key() -> MasterKey {
        MasterKey::from_bytes([9u8; KEY_LENGTH])
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let key = test_key();
        let plaintext = b"Hello, MedGuard record!";
        let encrypted = key.encrypt(plaintext).unwrap();
        let decrypted = key.decrypt(&encrypted).unwrap();
        assert_eq!(&decrypted, plaintext);
    }

    #[test]
    fn decrypt_with_wrong_key_fails() {
        let key1 = MasterKey::generate();
        let key2 = MasterKey::generate();
        let encrypted = key1.encrypt(b"secret").unwrap();
        let result = key2.decrypt(&encrypted);
        assert!(matches!(result, Err(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn tampered_ciphertext_detected() {
        let key = test_key();
        let encrypted = key.encrypt(b"secret data").unwrap();
        let mut tampered = encrypted.clone();
        tampered.ciphertext[0] ^= 0xFF;
        assert!(key.decrypt(&tampered).is_err());
    }

    #[test]
    fn from_bytes_rejects_too_short() {
        let result = EncryptedData::from_bytes(&[0u8; 10]);
        assert!(matches!(result, Err(CryptoError::MalformedCiphertext)));
    }

    #[test]
    fn different_encryptions_produce_different_nonces() {
        let key = test_key();
        let e1 = key.encrypt(b"same data").unwrap();
        let e2 = key.encrypt(b"same data").unwrap();
        assert_ne!(e1.nonce, e2.nonce);
    }

    #[test]
    fn json_payload_survives_seal_and_open() {
        let key = test_key();
        let payload = json!({
            "doctor": "Smith",
            "date": "2024-01-01",
            "tests": ["cbc", "lipid"],
            "amount": 125.5,
            "nested": {"urgent": false, "notes": null}
        });
        let blob = seal_json(&key, &payload).unwrap();
        assert_eq!(open_json(&key, &blob).unwrap(), payload);
    }

    #[test]
    fn sealed_blob_does_not_contain_plaintext() {
        let key = test_key();
        let blob = seal_json(&key, &json!({"doctor": "Smith"})).unwrap();
        let needle = b"Smith";
        assert!(!blob.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn open_json_with_other_key_fails() {
        let blob = seal_json(&test_key(), &json!({"a": 1})).unwrap();
        let other = MasterKey::from_bytes([3u8; KEY_LENGTH]);
        assert!(matches!(
            open_json(&other, &blob),
            Err(CryptoError::DecryptionFailed)
        ));
    }
}
