//! Timing-safe equality for credentials and signatures.
//!
//! All credential checks in this service go through [`timing_safe_eq`]: token
//! signatures, submitted passwords, and CSRF values. The comparison must not
//! leak *where* two inputs first differ through elapsed time.
//!
//! # Length Mismatch
//!
//! Constant-time guarantees across differing lengths are inherently limited:
//! the length itself is not secret, but we still burn a full comparison
//! before rejecting so that length-equal and length-unequal rejections fall
//! in the same gross timing class. Best-effort mitigation, not a formal
//! guarantee.

use subtle::ConstantTimeEq;

/// Compare two byte sequences in constant time.
///
/// Returns `true` iff the sequences are byte-equal. Never short-circuits on
/// the first differing byte.
pub fn timing_safe_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        // Self-comparison costs the same as a real one; discard the result.
        let _ = a.ct_eq(a);
        return false;
    }

    a.ct_eq(b).into()
}

/// Compare two strings in constant time.
///
/// Convenience wrapper for credential strings (e.g., a submitted password
/// against the configured one), not only hex-encoded signatures.
pub fn timing_safe_eq_str(a: &str, b: &str) -> bool {
    timing_safe_eq(a.as_bytes(), b.as_bytes())
}
