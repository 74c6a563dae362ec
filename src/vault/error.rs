//! Vault error types

use thiserror::Error;

use crate::keystore::KeystoreError;

/// Errors from vault persistence operations
#[derive(Debug, Error)]
pub enum VaultError {
    /// A document could not be encrypted or written
    #[error(transparent)]
    Keystore(#[from] KeystoreError),

    /// Directory or file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for vault operations
pub type VaultResult<T> = Result<T, VaultError>;
