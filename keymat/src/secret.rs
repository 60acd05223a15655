//! Zeroizing buffers for key material.
//!
//! All secret-derived buffers in this crate (SKEYID and its
//! descendants, the PSK copy, PRF seed buffers) are variable-length and
//! use [`SecretBytes`].

use zeroize::Zeroizing;

/// A heap-allocated secret byte string that is zeroized when dropped.
pub type SecretBytes = Zeroizing<Vec<u8>>;

/// Wraps `bytes` as a [`SecretBytes`], taking ownership.
pub fn secret(bytes: Vec<u8>) -> SecretBytes {
    Zeroizing::new(bytes)
}
