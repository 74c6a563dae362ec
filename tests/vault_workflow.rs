//! End-to-end key custody workflow tests
//!
//! These exercise the full public surface at production KDF strength:
//! generate a key, vault it under a password, reopen the vault from disk,
//! recover the plaintext, and sign/verify with it.

use alloy_primitives::keccak256;
use chainkey::{
    recover, secret_to_address, sign, to_public, verify, ExposeSecret, Secret, SecretString,
    SecretVault,
};
use tempfile::TempDir;

fn password(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

#[test]
fn import_reload_and_sign() {
    let dir = TempDir::new().expect("failed to create temp dir");

    // Generate an identity and vault its secret.
    let secret = Secret::generate(&mut rand::thread_rng());
    let address = secret_to_address(&secret);

    let vault = SecretVault::open(dir.path()).expect("failed to open vault");
    let id = vault
        .import_secret(&secret.to_bytes(), "workflow-passphrase")
        .expect("failed to import secret");

    // Import caches the plaintext: no prompt needed.
    let cached = vault
        .secret(&id, || panic!("import should have cached the plaintext"))
        .expect("cached secret missing");
    assert_eq!(cached.expose_secret().as_slice(), &secret.to_bytes());

    // A fresh vault over the same directory sees the entry and decrypts it.
    let reopened = SecretVault::open(dir.path()).expect("failed to reopen vault");
    assert!(reopened.contains(&id));
    let restored = reopened
        .secret(&id, || password("workflow-passphrase"))
        .expect("failed to decrypt reloaded entry");

    let restored_bytes: [u8; 32] = restored
        .expose_secret()
        .as_slice()
        .try_into()
        .expect("restored secret has wrong length");
    let restored_secret = Secret::from_bytes(&restored_bytes).expect("restored secret invalid");
    assert_eq!(secret_to_address(&restored_secret), address);

    // Sign with the restored key and verify both directly and by recovery.
    let digest = keccak256(b"transaction payload");
    let signature = sign(&restored_secret, &digest).expect("signing failed");
    assert!(signature.is_low_s());
    assert!(signature.v() <= 1);
    assert!(verify(&to_public(&secret), &signature, &digest));
    assert_eq!(recover(&signature, &digest), Some(to_public(&secret)));
}

#[test]
fn wrong_password_yields_nothing() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let vault = SecretVault::open(dir.path()).expect("failed to open vault");

    let mut secret = [0u8; 32];
    secret[31] = 0x01;
    let id = vault
        .import_secret(&secret, "test")
        .expect("failed to import secret");

    vault.clear_cache();
    assert!(vault.secret(&id, || password("wrong")).is_none());

    let recovered = vault
        .secret(&id, || password("test"))
        .expect("correct password rejected");
    assert_eq!(recovered.expose_secret().as_slice(), &secret);
}
