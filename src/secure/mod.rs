//! Secure memory handling for secret material
//!
//! Plaintext key bytes and passwords are wrapped in `secrecy` containers so
//! they are zeroized on drop and masked in `Debug` output. Every decrypted
//! secret handed across the crate API uses these types; raw `Vec<u8>` copies
//! of key material never outlive a call.

use secrecy::SecretBox;

pub use secrecy::ExposeSecret;

/// A secret byte buffer that is zeroized on drop.
///
/// Used for decrypted key material and PBKDF2-derived keys. The inner value
/// is only reachable through `expose_secret()`.
pub type SecretBytes = SecretBox<Vec<u8>>;

/// A secret string that is zeroized on drop, used for passwords.
pub type SecretString = secrecy::SecretString;

/// Wrap a byte vector as secret material.
pub fn secret_bytes(bytes: Vec<u8>) -> SecretBytes {
    SecretBox::new(Box::new(bytes))
}

/// Copy secret material into a fresh zeroizing container.
///
/// `SecretBox` deliberately does not implement `Clone` for arbitrary inner
/// types; the vault needs an explicit copy when serving a cached entry.
pub fn clone_secret(secret: &SecretBytes) -> SecretBytes {
    secret_bytes(secret.expose_secret().clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_bytes_roundtrip() {
        let secret = secret_bytes(vec![1, 2, 3, 4]);
        assert_eq!(secret.expose_secret(), &vec![1, 2, 3, 4]);
    }

    #[test]
    fn clone_is_independent() {
        let secret = secret_bytes(vec![9; 32]);
        let copy = clone_secret(&secret);
        drop(secret);
        assert_eq!(copy.expose_secret(), &vec![9; 32]);
    }
}
