//! Secp256k1 identity and recoverable-signature operations
//!
//! This module derives public identities and 20-byte addresses from secret
//! scalars and produces 65-byte recoverable signatures over 32-byte digests:
//!
//! - address derivation: `keccak256(uncompressed_pubkey[1..])[12..]`
//! - signature layout: `r[0:32] || s[32:64] || v[64]`, `v` in `{0, 1}` after
//!   low-s canonicalization
//! - verification is recovery-based: recover the signer and compare by value
//!
//! Uses the k256 crate for curve arithmetic; range and canonical-form checks
//! go through the shared [`CurveContext`].

use alloy_primitives::{keccak256, Address, B256, U256};
use k256::{
    ecdsa::{
        signature::hazmat::PrehashVerifier, RecoveryId, Signature as EcdsaSignature, SigningKey,
        VerifyingKey,
    },
    elliptic_curve::sec1::ToEncodedPoint,
    SecretKey,
};
use rand::{CryptoRng, RngCore};

use crate::context::CurveContext;
use crate::error::CryptoError;

/// A secret scalar (32 bytes big-endian, in `[1, n)`).
#[derive(Clone)]
pub struct Secret(SecretKey);

impl Secret {
    /// Generate a new random secret.
    pub fn generate<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        Self(SecretKey::random(rng))
    }

    /// Load from raw bytes. Rejects the zero scalar and values at or above
    /// the curve order.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        SecretKey::from_slice(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidSecretKey)
    }

    /// Serialize to raw bytes. Handle with care; prefer keeping the secret
    /// inside this wrapper.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes().into()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// An uncompressed public key with the SEC1 header byte stripped (64 bytes).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Public([u8; 64]);

impl Public {
    /// Wrap raw x || y coordinate bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// The all-zero placeholder, never a valid curve point.
    pub fn zero() -> Self {
        Self([0u8; 64])
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 64]
    }

    fn from_verifying_key(key: &VerifyingKey) -> Self {
        let encoded = key.to_encoded_point(false);
        let bytes = encoded.as_bytes();
        debug_assert_eq!(bytes[0], 0x04);
        let mut out = [0u8; 64];
        out.copy_from_slice(&bytes[1..]);
        Self(out)
    }
}

impl std::fmt::Debug for Public {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Public({}…)", hex::encode(&self.0[..8]))
    }
}

/// A compressed public key (33 bytes, SEC1 header 0x02/0x03 retained).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicCompressed([u8; 33]);

impl PublicCompressed {
    pub fn from_bytes(bytes: [u8; 33]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }
}

impl std::fmt::Debug for PublicCompressed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicCompressed({}…)", hex::encode(&self.0[..8]))
    }
}

/// A recoverable signature: `r || s || v`, 65 bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; 65]);

impl Signature {
    pub fn from_bytes(bytes: [u8; 65]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    pub fn r(&self) -> U256 {
        U256::from_be_slice(&self.0[..32])
    }

    pub fn s(&self) -> U256 {
        U256::from_be_slice(&self.0[32..64])
    }

    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// Shape check: `v <= 1`, `0 < r < n`, `0 < s < n`.
    pub fn is_valid(&self) -> bool {
        let ctx = CurveContext::get();
        self.v() <= 1 && ctx.contains_scalar(&self.r()) && ctx.contains_scalar(&self.s())
    }

    /// Whether `s` is in canonical low-s form.
    pub fn is_low_s(&self) -> bool {
        CurveContext::get().is_low_s(&self.s())
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({}…, v={})", hex::encode(&self.0[..8]), self.v())
    }
}

/// Derive the uncompressed public key (header stripped) for a secret.
pub fn to_public(secret: &Secret) -> Public {
    let encoded = secret.0.public_key().to_encoded_point(false);
    let bytes = encoded.as_bytes();
    let mut out = [0u8; 64];
    out.copy_from_slice(&bytes[1..]);
    Public(out)
}

/// Derive the compressed public key for a secret.
pub fn to_public_compressed(secret: &Secret) -> PublicCompressed {
    let encoded = secret.0.public_key().to_encoded_point(true);
    let mut out = [0u8; 33];
    out.copy_from_slice(encoded.as_bytes());
    PublicCompressed(out)
}

/// Expand a compressed public key to the 64-byte uncompressed form.
pub fn decompress_public(key: &PublicCompressed) -> Result<Public, CryptoError> {
    let parsed =
        k256::PublicKey::from_sec1_bytes(&key.0).map_err(|_| CryptoError::InvalidPublicKey)?;
    let encoded = parsed.to_encoded_point(false);
    let bytes = encoded.as_bytes();
    let mut out = [0u8; 64];
    out.copy_from_slice(&bytes[1..]);
    Ok(Public(out))
}

/// Derive the 20-byte address of a public key: the low 160 bits of its hash.
pub fn to_address(public: &Public) -> Address {
    let hash = keccak256(public.as_bytes());
    Address::from_slice(&hash[12..])
}

/// Derive the address for a secret directly.
pub fn secret_to_address(secret: &Secret) -> Address {
    to_address(&to_public(secret))
}

/// Derive the deterministic contract address for a sender and nonce: the low
/// 160 bits of the hash of the length-prefixed (RLP) encoding of both.
pub fn contract_address(sender: &Address, nonce: u64) -> Address {
    sender.create(nonce)
}

/// Produce a recoverable signature over a 32-byte digest.
///
/// The nonce is deterministic (RFC 6979), and the result is always in
/// canonical low-s form: when the raw `s` exceeds `n/2` it is replaced by
/// `n - s` and the recovery id's parity bit is flipped.
pub fn sign(secret: &Secret, digest: &B256) -> Result<Signature, CryptoError> {
    let signing_key = SigningKey::from(&secret.0);
    let (sig, recovery_id) = signing_key
        .sign_prehash_recoverable(digest.as_slice())
        .map_err(|_| CryptoError::InvalidSecretKey)?;

    let mut out = [0u8; 65];
    out[..64].copy_from_slice(sig.to_bytes().as_slice());
    out[64] = recovery_id.to_byte();

    let ctx = CurveContext::get();
    let s = U256::from_be_slice(&out[32..64]);
    if !ctx.is_low_s(&s) {
        out[32..64].copy_from_slice(&ctx.mirror_s(&s).to_be_bytes::<32>());
        out[64] ^= 1;
    }
    Ok(Signature(out))
}

/// Recover the signer's public key from a signature and digest.
///
/// Returns `None` for recovery ids above 3 and for any malformed `r`/`s` or
/// failed point recovery; `None` means "no public key", it is not comparable
/// to any valid key.
pub fn recover(sig: &Signature, digest: &B256) -> Option<Public> {
    if sig.v() > 3 {
        return None;
    }
    let recovery_id = RecoveryId::from_byte(sig.v())?;
    let parsed = EcdsaSignature::from_slice(&sig.0[..64]).ok()?;
    let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &parsed, recovery_id).ok()?;
    Some(Public::from_verifying_key(&key))
}

/// Verify a recoverable signature against a public key.
///
/// Recovery-based: recomputes the signer from the signature and compares by
/// full serialized value. A zero public key never verifies.
pub fn verify(public: &Public, sig: &Signature, digest: &B256) -> bool {
    if public.is_zero() {
        return false;
    }
    recover(sig, digest).is_some_and(|recovered| recovered == *public)
}

/// Verify a 64-byte non-recoverable signature directly against a compressed
/// public key, without recovery. Used when the signer is already known.
pub fn verify_compressed(key: &PublicCompressed, sig: &[u8; 64], digest: &B256) -> bool {
    let Ok(parsed) = EcdsaSignature::from_slice(sig) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(&key.0) else {
        return false;
    };
    verifying_key.verify_prehash(digest.as_slice(), &parsed).is_ok()
}
