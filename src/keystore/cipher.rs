//! AES-128-CBC encryption for the version-2 keystore format
//!
//! CBC with PKCS#7 padding and no built-in authentication; integrity comes
//! from the document MAC, which is checked before decryption is attempted.

use cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use serde::{Deserialize, Serialize};

use super::error::{KeystoreError, KeystoreResult};
use crate::secure::{secret_bytes, SecretBytes};

/// Cipher name recorded in version-2 documents.
pub const CIPHER_AES_128_CBC: &str = "aes-128-cbc";

/// AES-128 key length in bytes.
pub const AES_KEY_LENGTH: usize = 16;

/// Initialization vector length in bytes.
pub const IV_LENGTH: usize = 16;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// Cipher parameters as stored in a document's `cipherparams` object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CipherParams {
    /// Initialization vector, hex encoded.
    pub iv: String,
}

impl CipherParams {
    pub fn new(iv: &[u8]) -> Self {
        Self {
            iv: hex::encode(iv),
        }
    }

    /// Decode and validate the IV.
    pub fn iv(&self) -> KeystoreResult<[u8; IV_LENGTH]> {
        let bytes = hex::decode(&self.iv)
            .map_err(|e| KeystoreError::HexError(format!("invalid IV hex: {e}")))?;
        bytes.as_slice().try_into().map_err(|_| {
            KeystoreError::InvalidCipherParams(format!(
                "IV must be {IV_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })
    }
}

/// Encrypt plaintext with AES-128-CBC.
pub fn encrypt_secret(
    plain: &[u8],
    key: &[u8; AES_KEY_LENGTH],
    iv: &[u8; IV_LENGTH],
) -> Vec<u8> {
    Aes128CbcEnc::new(key.into(), iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plain)
}

/// Decrypt ciphertext with AES-128-CBC. Fails on empty, misaligned, or
/// badly padded input.
pub fn decrypt_secret(
    ciphertext: &[u8],
    key: &[u8; AES_KEY_LENGTH],
    iv: &[u8; IV_LENGTH],
) -> KeystoreResult<SecretBytes> {
    let plain = Aes128CbcDec::new(key.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| KeystoreError::CipherError("invalid ciphertext padding".to_string()))?;
    Ok(secret_bytes(plain))
}

/// Draw a random IV.
pub fn generate_iv() -> [u8; IV_LENGTH] {
    use rand::RngCore;
    let mut iv = [0u8; IV_LENGTH];
    rand::thread_rng().fill_bytes(&mut iv);
    iv
}
