//! Encrypt-then-encode wrapper around each record
//! Location: src/telemetry/envelope.rs
//!
//! AES-256-CBC with PKCS#7 padding, standard Base64 without line breaks.
//! Key and IV come from configuration as hex strings.

use crate::config::constants::telemetry::{AES_IV_BYTES, AES_KEY_BYTES};
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt;
use thiserror::Error;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("{field} is not valid hex: {source}")]
    InvalidHex {
        field: &'static str,
        #[source]
        source: hex::FromHexError,
    },

    #[error("key must be {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("IV must be {expected} bytes, got {actual}")]
    InvalidIvLength { expected: usize, actual: usize },

    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decryption failed (wrong key or corrupted payload)")]
    Decrypt,
}

/// Turns a plaintext record into a transport-safe string and back
pub trait EnvelopeCipher {
    fn seal(&self, plaintext: &[u8]) -> String;
    fn open(&self, sealed: &str) -> Result<Vec<u8>, EnvelopeError>;
}

/// AES-256-CBC envelope with a fixed IV
#[derive(Clone)]
pub struct AesCbcEnvelope {
    key: [u8; AES_KEY_BYTES],
    iv: [u8; AES_IV_BYTES],
}

impl AesCbcEnvelope {
    pub fn new(key: [u8; AES_KEY_BYTES], iv: [u8; AES_IV_BYTES]) -> Self {
        Self { key, iv }
    }

    pub fn from_hex(key_hex: &str, iv_hex: &str) -> Result<Self, EnvelopeError> {
        let key = hex::decode(key_hex.trim()).map_err(|source| EnvelopeError::InvalidHex {
            field: "key_hex",
            source,
        })?;
        let iv = hex::decode(iv_hex.trim()).map_err(|source| EnvelopeError::InvalidHex {
            field: "iv_hex",
            source,
        })?;

        let key: [u8; AES_KEY_BYTES] = key
            .as_slice()
            .try_into()
            .map_err(|_| EnvelopeError::InvalidKeyLength {
                expected: AES_KEY_BYTES,
                actual: key.len(),
            })?;
        let iv: [u8; AES_IV_BYTES] = iv
            .as_slice()
            .try_into()
            .map_err(|_| EnvelopeError::InvalidIvLength {
                expected: AES_IV_BYTES,
                actual: iv.len(),
            })?;

        Ok(Self::new(key, iv))
    }
}

impl EnvelopeCipher for AesCbcEnvelope {
    fn seal(&self, plaintext: &[u8]) -> String {
        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &self.iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext);
        STANDARD.encode(ciphertext)
    }

    fn open(&self, sealed: &str) -> Result<Vec<u8>, EnvelopeError> {
        let ciphertext = STANDARD.decode(sealed.trim())?;
        Aes256CbcDec::new(&self.key.into(), &self.iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| EnvelopeError::Decrypt)
    }
}

impl fmt::Debug for AesCbcEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesCbcEnvelope")
            .field("key", &"<redacted>")
            .field("iv", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
    const IV: &str = "000102030405060708090a0b0c0d0e0f";

    #[test]
    fn test_known_vector() {
        // NIST SP 800-38A F.2.5, first block (no padding check)
        let key = hex::decode("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4").unwrap();
        let iv = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let envelope = AesCbcEnvelope::from_hex(&hex::encode(&key), &hex::encode(&iv)).unwrap();
        let plaintext = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();

        let sealed = envelope.seal(&plaintext);
        let raw = STANDARD.decode(&sealed).unwrap();
        // 16-byte input gains a full block of padding
        assert_eq!(raw.len(), 32);
        assert_eq!(hex::encode(&raw[..16]), "f58c4c04d6e5f1ba779eabfb5f7bfbd6");
    }

    #[test]
    fn test_seal_open() {
        let envelope = AesCbcEnvelope::from_hex(KEY, IV).unwrap();
        let msg = br#"{"timestamp": 1}"#;
        let sealed = envelope.seal(msg);
        assert!(!sealed.contains('\n'));
        assert_eq!(envelope.open(&sealed).unwrap(), msg.to_vec());
    }

    #[test]
    fn test_bad_key_material() {
        assert!(matches!(
            AesCbcEnvelope::from_hex("abcd", IV),
            Err(EnvelopeError::InvalidKeyLength { expected: 32, actual: 2 })
        ));
        assert!(matches!(
            AesCbcEnvelope::from_hex(KEY, "00ff"),
            Err(EnvelopeError::InvalidIvLength { expected: 16, actual: 2 })
        ));
        assert!(matches!(
            AesCbcEnvelope::from_hex("zz", IV),
            Err(EnvelopeError::InvalidHex { field: "key_hex", .. })
        ));
    }

    #[test]
    fn test_wrong_key_fails_or_garbles() {
        let a = AesCbcEnvelope::from_hex(KEY, IV).unwrap();
        let other_key = "ff".repeat(32);
        let b = AesCbcEnvelope::from_hex(&other_key, IV).unwrap();
        let sealed = a.seal(b"hello telemetry");
        match b.open(&sealed) {
            Ok(plain) => assert_ne!(plain, b"hello telemetry".to_vec()),
            Err(e) => assert!(matches!(e, EnvelopeError::Decrypt)),
        }
    }

    #[test]
    fn test_debug_redacts_key() {
        let envelope = AesCbcEnvelope::from_hex(KEY, IV).unwrap();
        assert!(!format!("{:?}", envelope).contains("0001"));
    }
}
