//! Versioned encrypted keystore documents
//!
//! Stateless transform between plaintext secret bytes and the self-describing
//! version-2 document format:
//!
//! - PBKDF2-HMAC-SHA256 key derivation (262144 iterations, 16-byte key)
//! - AES-128-CBC encryption keyed by a hash of the derived key, never the
//!   raw PBKDF2 output
//! - keccak-256 integrity tag over derived-key tail and ciphertext, checked
//!   before decryption
//! - JSON serialization, one document per secret
//!
//! Wrong passwords and tampered documents fail the same MAC check; callers
//! cannot tell the two apart.

mod cipher;
mod document;
mod error;
mod kdf;
mod mac;

pub use cipher::{CipherParams, CIPHER_AES_128_CBC, IV_LENGTH};
pub use document::{CryptoParams, KeyFile, KEYSTORE_VERSION};
pub use error::{KeystoreError, KeystoreResult};
pub use kdf::{KdfParams, KDF_PBKDF2, PBKDF2_DKLEN, PBKDF2_ITERATIONS, PRF_HMAC_SHA256};
pub use mac::compute_mac;
