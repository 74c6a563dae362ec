//! Process-wide curve context for secp256k1
//!
//! All scalar-range and canonical-form decisions in the signature engine go
//! through a single lazily constructed, read-only context. It is built exactly
//! once per process and shared freely across threads; construction failure is
//! fatal because there is no cryptographic engine to degrade to.

use alloy_primitives::U256;
use once_cell::sync::Lazy;

/// The secp256k1 group order `n`, big-endian hex.
const CURVE_ORDER_HEX: &str = "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

static CONTEXT: Lazy<CurveContext> = Lazy::new(|| {
    let order = U256::from_str_radix(CURVE_ORDER_HEX, 16)
        .expect("secp256k1 curve context construction failed");
    CurveContext {
        order,
        half_order: order >> 1,
    }
});

/// Shared secp256k1 group constants.
///
/// Read-only after construction; safe for unsynchronized concurrent use.
#[derive(Debug)]
pub struct CurveContext {
    order: U256,
    half_order: U256,
}

impl CurveContext {
    /// Access the process-wide context, constructing it on first use.
    pub fn get() -> &'static CurveContext {
        &CONTEXT
    }

    /// The curve group order `n`.
    pub fn order(&self) -> U256 {
        self.order
    }

    /// `n / 2`, the canonical upper bound for a signature's `s` component.
    pub fn half_order(&self) -> U256 {
        self.half_order
    }

    /// Whether `x` is a valid non-zero scalar, i.e. lies in `[1, n)`.
    pub fn contains_scalar(&self, x: &U256) -> bool {
        *x > U256::ZERO && *x < self.order
    }

    /// Whether `s` is in canonical low-s form (`s <= n/2`).
    pub fn is_low_s(&self, s: &U256) -> bool {
        *s <= self.half_order
    }

    /// The mirrored scalar `n - s`, used when canonicalizing a high-s
    /// signature. Callers guarantee `s < n`.
    pub fn mirror_s(&self, s: &U256) -> U256 {
        self.order - s
    }
}
