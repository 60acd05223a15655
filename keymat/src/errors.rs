//! Error types returned by key derivation.
//!
//! Follows the teacher crate's convention (`protocol::errors::X3DHError`):
//! a plain enum with a hand-written `Display` and `std::error::Error`
//! impl, populated via `From` conversions rather than `thiserror`.

use std::fmt::{Display, Formatter};

/// Errors `derive_ike_keys` can report. See spec §7.
#[derive(Debug)]
pub enum DerivationError {
    /// The proposal carries no PRF and the negotiated integrity algorithm
    /// has no PRF mapping.
    NoPrfSelected,

    /// The crypto registry could not instantiate the selected PRF.
    PrfUnavailable,

    /// The PRF's block size is smaller than its key size; RFC 2409
    /// Appendix B expansion of SKEYID itself is not implemented.
    PrfExpansionRequired,

    /// The Diffie-Hellman handle failed to produce a shared secret.
    DhFailed,

    /// An authentication class other than PSK was requested.
    AuthClassUnsupported,

    /// PSK authentication was requested but no key was supplied.
    MissingPsk,

    /// The proposal carries no encryption algorithm.
    NoEncryptionSelected,

    /// The crypto registry could not instantiate the selected cipher.
    CipherUnavailable,

    /// The negotiated integrity algorithm has no hash mapping.
    NoHashSelected,

    /// The crypto registry could not instantiate the selected hasher.
    HashUnavailable,

    /// Derivation was already performed on this `KeyMaterial`.
    AlreadyDerived,

    /// An IV operation (`get_iv`/`update_iv`/`confirm_iv`) was invoked
    /// before `derive_ike_keys` succeeded.
    NotDerived,
}

impl Display for DerivationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DerivationError::NoPrfSelected => write!(f, "no pseudo-random function selected"),
            DerivationError::PrfUnavailable => write!(f, "pseudo-random function not supported"),
            DerivationError::PrfExpansionRequired => {
                write!(f, "expansion of PRF output not supported")
            }
            DerivationError::DhFailed => write!(f, "Diffie-Hellman exchange failed"),
            DerivationError::AuthClassUnsupported => {
                write!(f, "authentication class not supported")
            }
            DerivationError::MissingPsk => write!(f, "pre-shared key required but not supplied"),
            DerivationError::NoEncryptionSelected => write!(f, "no encryption algorithm selected"),
            DerivationError::CipherUnavailable => write!(f, "encryption algorithm not supported"),
            DerivationError::NoHashSelected => write!(f, "no hash algorithm selected"),
            DerivationError::HashUnavailable => write!(f, "hash algorithm not supported"),
            DerivationError::AlreadyDerived => {
                write!(f, "key material has already been derived for this SA")
            }
            DerivationError::NotDerived => {
                write!(f, "key material has not been derived yet")
            }
        }
    }
}

impl std::error::Error for DerivationError {}

// `digest::InvalidLength` and `cipher::InvalidLength` are both
// re-exports of the same `crypto_common` type, so a single `From` impl
// covers HMAC key-length failures and block-cipher key/IV-length
// failures alike. Call sites pick the right `DerivationError` variant
// explicitly with `.map_err(|_| ...)` where the two must be told apart.
impl From<digest::InvalidLength> for DerivationError {
    fn from(_: digest::InvalidLength) -> Self {
        DerivationError::PrfUnavailable
    }
}
