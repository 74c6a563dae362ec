//! The versioned encrypted key document
//!
//! One JSON document per secret:
//!
//! ```json
//! {
//!   "crypto": {
//!     "kdf": "pbkdf2",
//!     "kdfparams": {"prf":"hmac-sha256","c":262144,"salt":"…","dklen":16},
//!     "cipher": "aes-128-cbc",
//!     "cipherparams": {"iv":"…"},
//!     "ciphertext": "…",
//!     "mac": "…"
//!   },
//!   "id": "<uuid>",
//!   "version": 2
//! }
//! ```
//!
//! Version 2 is the only format written or fully trusted. Readers also accept
//! a legacy string-typed `"Version"` field; that spelling is never produced.

use std::fs;
use std::path::Path;

use alloy_primitives::keccak256;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cipher::{decrypt_secret, encrypt_secret, generate_iv, CipherParams, CIPHER_AES_128_CBC};
use super::error::{KeystoreError, KeystoreResult};
use super::kdf::{generate_salt, KdfParams, KDF_PBKDF2};
use super::mac::{compute_mac, constant_time_eq};
use crate::secure::{ExposeSecret, SecretBytes};

/// The document format version this crate writes and trusts.
pub const KEYSTORE_VERSION: u32 = 2;

/// Crypto parameters of one document: KDF, cipher, ciphertext and MAC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoParams {
    pub kdf: String,
    pub kdfparams: KdfParams,
    pub cipher: String,
    pub cipherparams: CipherParams,
    pub ciphertext: String,
    pub mac: String,
}

/// A self-describing encrypted key document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyFile {
    pub crypto: CryptoParams,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Legacy capitalized spelling with a string value; read-only fallback.
    #[serde(rename = "Version", default, skip_serializing_if = "Option::is_none")]
    legacy_version: Option<String>,
}

impl KeyFile {
    /// Encrypt a secret under a password into a fresh version-2 document.
    pub fn encrypt(plain: &[u8], password: &str) -> KeystoreResult<Self> {
        Self::encrypt_with_kdf(plain, password, KdfParams::new(&generate_salt()))
    }

    pub(crate) fn encrypt_with_kdf(
        plain: &[u8],
        password: &str,
        kdfparams: KdfParams,
    ) -> KeystoreResult<Self> {
        let derived = kdfparams.derive_key(password)?;
        let dk = derived.expose_secret();

        let iv = generate_iv();
        let ciphertext = encrypt_secret(plain, &cipher_key(dk), &iv);
        let mac = compute_mac(dk, &ciphertext)?;

        Ok(Self {
            crypto: CryptoParams {
                kdf: KDF_PBKDF2.to_string(),
                kdfparams,
                cipher: CIPHER_AES_128_CBC.to_string(),
                cipherparams: CipherParams::new(&iv),
                ciphertext: hex::encode(&ciphertext),
                mac: hex::encode(mac),
            },
            id: Uuid::new_v4().to_string(),
            version: Some(KEYSTORE_VERSION),
            legacy_version: None,
        })
    }

    /// Decrypt the document with a password.
    ///
    /// The MAC is verified before any decryption is attempted; a mismatch
    /// means a wrong password or a tampered document and the two are not
    /// distinguished.
    pub fn decrypt(&self, password: &str) -> KeystoreResult<SecretBytes> {
        if self.crypto.kdf != KDF_PBKDF2 {
            return Err(KeystoreError::UnsupportedKdf(self.crypto.kdf.clone()));
        }
        let derived = self.crypto.kdfparams.derive_key(password)?;
        let dk = derived.expose_secret();

        let ciphertext = hex::decode(&self.crypto.ciphertext)
            .map_err(|e| KeystoreError::HexError(format!("invalid ciphertext hex: {e}")))?;
        let mac = hex::decode(&self.crypto.mac)
            .map_err(|e| KeystoreError::HexError(format!("invalid mac hex: {e}")))?;
        let expected = compute_mac(dk, &ciphertext)?;
        if !constant_time_eq(&mac, &expected) {
            return Err(KeystoreError::InvalidPassword);
        }

        if self.crypto.cipher != CIPHER_AES_128_CBC {
            return Err(KeystoreError::UnsupportedCipher(self.crypto.cipher.clone()));
        }
        let iv = self.crypto.cipherparams.iv()?;
        decrypt_secret(&ciphertext, &cipher_key(dk), &iv)
    }

    /// The entry identifier.
    pub fn uuid(&self) -> KeystoreResult<Uuid> {
        Uuid::parse_str(&self.id).map_err(|e| KeystoreError::InvalidId(e.to_string()))
    }

    /// The document's format version; the legacy string-typed field wins
    /// when both spellings are present, matching the historical reader.
    pub fn format_version(&self) -> u32 {
        self.legacy_version
            .as_deref()
            .and_then(|v| v.parse().ok())
            .or(self.version)
            .unwrap_or(0)
    }

    /// Write the document to a file with restricted permissions.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> KeystoreResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    /// Read a document from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> KeystoreResult<Self> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}

/// The AES key for a document: `keccak256(dk[len-16..])[16..32]`. The raw
/// PBKDF2 output never keys the cipher directly; the MAC uses the untouched
/// tail, so the two roles get separated key material.
fn cipher_key(derived_key: &[u8]) -> [u8; 16] {
    let hash = keccak256(&derived_key[derived_key.len() - 16..]);
    let mut key = [0u8; 16];
    key.copy_from_slice(&hash[16..]);
    key
}
