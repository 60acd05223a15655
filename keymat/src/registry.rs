//! `CryptoRegistry`: dependency-injected replacement for the source's
//! global `lib->crypto` factory singleton.
//!
//! `derive_ike_keys` and `KeyMaterial` take a `&dyn CryptoRegistry`
//! rather than reaching for ambient global state, so callers can swap
//! in a registry backed by fewer algorithms (e.g. a FIPS-restricted
//! build) or one that wraps hardware-backed primitives, without this
//! crate needing to change.

use crate::algorithm::{DhGroup, EncryptionAlgorithm, HashAlgorithm, PrfAlgorithm};
use crate::blockcipher::{Aes128Cbc, Aes192Cbc, Aes256Cbc, BlockCipherAlgo, TripleDesCbc};
use crate::dh::{Curve25519Dh, DiffieHellman, ModpDh};
use crate::hasher::{Hasher, Md5Hasher, Sha1Hasher, Sha256Hasher, Sha384Hasher, Sha512Hasher};
use crate::prf::{HmacMd5Prf, HmacSha1Prf, HmacSha256Prf, HmacSha384Prf, HmacSha512Prf, Prf};
use crate::xcbc::AesXcbcPrf;

/// A factory for the concrete primitives key derivation is built from.
pub trait CryptoRegistry: Send + Sync {
    fn create_prf(&self, alg: PrfAlgorithm) -> Option<Box<dyn Prf>>;

    fn create_hasher(&self, alg: HashAlgorithm) -> Option<Box<dyn Hasher>>;

    /// Instantiates `alg` already keyed with `key`, or `None` if `key`'s
    /// length does not match what `alg` requires.
    fn create_cipher(&self, alg: EncryptionAlgorithm, key: &[u8]) -> Option<Box<dyn BlockCipherAlgo>>;

    /// Generates a fresh Diffie-Hellman key pair for `group`.
    fn create_dh(&self, group: DhGroup) -> Option<Box<dyn DiffieHellman>>;
}

/// The registry wired to every primitive this crate implements.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRegistry;

impl CryptoRegistry for DefaultRegistry {
    fn create_prf(&self, alg: PrfAlgorithm) -> Option<Box<dyn Prf>> {
        Some(match alg {
            PrfAlgorithm::HmacMd5 => Box::new(HmacMd5Prf::new()),
            PrfAlgorithm::HmacSha1 => Box::new(HmacSha1Prf::new()),
            PrfAlgorithm::HmacSha2_256 => Box::new(HmacSha256Prf::new()),
            PrfAlgorithm::HmacSha2_384 => Box::new(HmacSha384Prf::new()),
            PrfAlgorithm::HmacSha2_512 => Box::new(HmacSha512Prf::new()),
            PrfAlgorithm::Aes128Xcbc => Box::new(AesXcbcPrf::new()),
        })
    }

    fn create_hasher(&self, alg: HashAlgorithm) -> Option<Box<dyn Hasher>> {
        Some(match alg {
            HashAlgorithm::Md5 => Box::new(Md5Hasher),
            HashAlgorithm::Sha1 => Box::new(Sha1Hasher),
            HashAlgorithm::Sha256 => Box::new(Sha256Hasher),
            HashAlgorithm::Sha384 => Box::new(Sha384Hasher),
            HashAlgorithm::Sha512 => Box::new(Sha512Hasher),
        })
    }

    fn create_cipher(&self, alg: EncryptionAlgorithm, key: &[u8]) -> Option<Box<dyn BlockCipherAlgo>> {
        match alg {
            EncryptionAlgorithm::TripleDesCbc => {
                TripleDesCbc::new(key).map(|c| Box::new(c) as Box<dyn BlockCipherAlgo>)
            }
            EncryptionAlgorithm::AesCbc => match key.len() {
                16 => Aes128Cbc::new(key).map(|c| Box::new(c) as Box<dyn BlockCipherAlgo>),
                24 => Aes192Cbc::new(key).map(|c| Box::new(c) as Box<dyn BlockCipherAlgo>),
                32 => Aes256Cbc::new(key).map(|c| Box::new(c) as Box<dyn BlockCipherAlgo>),
                _ => None,
            },
        }
    }

    fn create_dh(&self, group: DhGroup) -> Option<Box<dyn DiffieHellman>> {
        Some(match group {
            DhGroup::Modp768 | DhGroup::Modp1024 | DhGroup::Modp1536 | DhGroup::Modp2048 => {
                Box::new(ModpDh::generate(group))
            }
            DhGroup::Curve25519 => Box::new(Curve25519Dh::generate()),
        })
    }
}
