//! Cryptographic identity and secret-key custody for a blockchain client
//!
//! This crate provides:
//! - secp256k1 key-to-address derivation and recoverable ECDSA signatures
//!   with deterministic nonces and low-s canonicalization
//! - public-key recovery from a signature plus message digest, and
//!   recovery-based verification
//! - a versioned, password-encrypted on-disk keystore format
//!   (PBKDF2 + AES-128-CBC + keccak MAC)
//! - a secret vault: an indexed directory of encrypted entries with a
//!   decrypted-plaintext cache and explicit invalidation
//!
//! Data-dependent failures (wrong password, malformed signature, corrupted
//! document) fail closed as `None`/`false`/typed errors; nothing in this
//! crate panics on untrusted input.

pub mod context;
pub mod error;
pub mod keystore;
pub mod secp256k1;
pub mod secure;
pub mod vault;

// Curve context
pub use context::CurveContext;

// Signature engine
pub use secp256k1::{
    contract_address, decompress_public, recover, secret_to_address, sign, to_address, to_public,
    to_public_compressed, verify, verify_compressed, Public, PublicCompressed, Secret, Signature,
};

// Error exports
pub use error::CryptoError;

// Keystore exports
pub use keystore::{KeyFile, KeystoreError, KEYSTORE_VERSION};

// Vault exports
pub use vault::{SecretVault, VaultError};

// Secure memory exports
pub use secure::{ExposeSecret, SecretBytes, SecretString};

// Fixed-size primitives shared with callers
pub use alloy_primitives::{Address, B256};
