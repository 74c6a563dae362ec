//! Keystore error types

use thiserror::Error;

/// Errors that can occur while encrypting or decrypting a keystore document
#[derive(Debug, Error)]
pub enum KeystoreError {
    /// Wrong password or tampered document (MAC mismatch). Deliberately does
    /// not distinguish the two cases.
    #[error("invalid password or corrupted keystore: MAC mismatch")]
    InvalidPassword,

    /// Unsupported KDF function
    #[error("unsupported KDF: {0}")]
    UnsupportedKdf(String),

    /// Unsupported PBKDF2 pseudo-random function
    #[error("unsupported PBKDF2 PRF: {0}")]
    UnsupportedPrf(String),

    /// Unsupported cipher function
    #[error("unsupported cipher: {0}")]
    UnsupportedCipher(String),

    /// Invalid KDF parameters
    #[error("invalid KDF parameters: {0}")]
    InvalidKdfParams(String),

    /// Invalid cipher parameters
    #[error("invalid cipher parameters: {0}")]
    InvalidCipherParams(String),

    /// Encryption/decryption failed
    #[error("cipher operation failed: {0}")]
    CipherError(String),

    /// Invalid hex encoding in a document field
    #[error("invalid hex encoding: {0}")]
    HexError(String),

    /// Malformed entry identifier
    #[error("invalid keystore id: {0}")]
    InvalidId(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for keystore operations
pub type KeystoreResult<T> = Result<T, KeystoreError>;
