//! Integrity tag for the version-2 keystore format
//!
//! The tag is `keccak256(derived_key[len-16..] || ciphertext)`: it binds both
//! the password-derived key and the ciphertext, so a wrong password and a
//! tampered document fail the same check.

use alloy_primitives::keccak256;
use zeroize::Zeroize;

use super::error::{KeystoreError, KeystoreResult};

/// Compute the document MAC from the derived key and ciphertext.
pub fn compute_mac(derived_key: &[u8], ciphertext: &[u8]) -> KeystoreResult<[u8; 32]> {
    if derived_key.len() < 16 {
        return Err(KeystoreError::InvalidKdfParams(format!(
            "derived key must be at least 16 bytes, got {}",
            derived_key.len()
        )));
    }
    let mut buf = Vec::with_capacity(16 + ciphertext.len());
    buf.extend_from_slice(&derived_key[derived_key.len() - 16..]);
    buf.extend_from_slice(ciphertext);
    let mac = keccak256(&buf);
    buf.zeroize();
    Ok(mac.0)
}

/// Constant-time comparison to prevent timing side channels.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut acc = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        acc |= x ^ y;
    }
    acc == 0
}
