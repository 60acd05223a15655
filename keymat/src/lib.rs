//! IKEv1 Phase-1 key material engine.
//!
//! Derives SKEYID and its descendants per RFC 2409 §5, expands
//! SKEYID_e per Appendix B when the negotiated cipher needs more key
//! material than the PRF naturally produces, and tracks the chained
//! CBC IVs RFC 2409 relies on in place of per-message random IVs.
//!
//! The crate is organized as a small stack of capability traits
//! ([`prf::Prf`], [`hasher::Hasher`], [`blockcipher::BlockCipherAlgo`],
//! [`dh::DiffieHellman`]), a [`registry::CryptoRegistry`] that
//! instantiates them, and [`keymat::KeyMaterial`] at the top tying
//! derivation, IV chaining and the cipher facade together for one SA.

pub mod algorithm;
pub mod blockcipher;
pub mod derive;
pub mod dh;
pub mod errors;
pub mod facade;
pub mod hasher;
pub mod ivchain;
pub mod keymat;
pub mod prf;
pub mod proposal;
pub mod registry;
pub mod secret;
mod xcbc;

pub use derive::{AuthClass, Role};
pub use errors::DerivationError;
pub use keymat::KeyMaterial;
pub use registry::{CryptoRegistry, DefaultRegistry};
pub use secret::SecretBytes;
