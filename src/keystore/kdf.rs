//! PBKDF2 key derivation for the version-2 keystore format
//!
//! The on-disk format records the KDF name and parameters alongside the
//! ciphertext; decryption re-derives the key from whatever the document
//! recorded, so old documents with non-default iteration counts stay
//! readable.

use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::error::{KeystoreError, KeystoreResult};
use crate::secure::{secret_bytes, SecretBytes};

/// KDF name recorded in version-2 documents.
pub const KDF_PBKDF2: &str = "pbkdf2";

/// The only PRF the format supports.
pub const PRF_HMAC_SHA256: &str = "hmac-sha256";

/// Iteration count written by `encrypt`.
pub const PBKDF2_ITERATIONS: u32 = 262_144;

/// Derived-key length written by `encrypt`.
pub const PBKDF2_DKLEN: u32 = 16;

/// Salt length in bytes.
pub const SALT_LENGTH: usize = 32;

/// PBKDF2 parameters as stored in a document's `kdfparams` object.
///
/// Fields are defaulted so a document naming an unknown KDF still parses and
/// gets rejected by name rather than by shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KdfParams {
    #[serde(default)]
    pub prf: String,
    #[serde(default)]
    pub c: u32,
    #[serde(default)]
    pub salt: String,
    #[serde(default)]
    pub dklen: u32,
}

impl KdfParams {
    /// Standard parameters for a fresh document, with the given salt.
    pub fn new(salt: &[u8]) -> Self {
        Self {
            prf: PRF_HMAC_SHA256.to_string(),
            c: PBKDF2_ITERATIONS,
            salt: hex::encode(salt),
            dklen: PBKDF2_DKLEN,
        }
    }

    /// Derive a key from the password per the recorded parameters.
    pub fn derive_key(&self, password: &str) -> KeystoreResult<SecretBytes> {
        if self.prf != PRF_HMAC_SHA256 {
            return Err(KeystoreError::UnsupportedPrf(self.prf.clone()));
        }
        if self.c == 0 {
            return Err(KeystoreError::InvalidKdfParams(
                "iteration count must be positive".to_string(),
            ));
        }
        // The MAC and cipher key are both taken from the last 16 bytes.
        if self.dklen < 16 {
            return Err(KeystoreError::InvalidKdfParams(format!(
                "dklen must be at least 16, got {}",
                self.dklen
            )));
        }
        let salt = hex::decode(&self.salt)
            .map_err(|e| KeystoreError::HexError(format!("invalid salt hex: {e}")))?;

        let mut output = vec![0u8; self.dklen as usize];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, self.c, &mut output);
        Ok(secret_bytes(output))
    }
}

/// Draw a random salt.
pub fn generate_salt() -> Vec<u8> {
    use rand::RngCore;
    let mut salt = vec![0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}
