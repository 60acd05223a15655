//! The `Prf` capability trait and its HMAC-backed and AES-XCBC-backed
//! implementations.

use digest::Digest;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};

use crate::xcbc::AesXcbcPrf;

/// A keyed pseudo-random function, used both for key derivation chaining
/// and, via [`crate::derive::expand_skeyid_e`], output expansion.
pub trait Prf: Send {
    /// Sets (or replaces) the key used by subsequent [`Prf::prf`] calls.
    fn set_key(&mut self, key: &[u8]);

    /// Computes `prf(key, seed)`, returning exactly [`Prf::block_size`] bytes.
    fn prf(&mut self, seed: &[u8]) -> Vec<u8>;

    /// The PRF's natural output length in bytes.
    fn block_size(&self) -> usize;

    /// The PRF's nominal key length in bytes, used only by the
    /// `block_size < key_size` expansion-required check in
    /// [`crate::derive::derive_ike_keys`]. HMAC-based PRFs accept any key
    /// length, so this equals [`Prf::block_size`] here (mirroring
    /// `prf_hmac_t.get_key_size` in the source); AES128-XCBC has a fixed
    /// 16-byte key, which also equals its block size.
    fn key_size(&self) -> usize;
}

macro_rules! hmac_prf {
    ($name:ident, $digest:ty) => {
        /// HMAC-based PRF.
        pub struct $name {
            mac: Option<Hmac<$digest>>,
        }

        impl $name {
            pub fn new() -> Self {
                Self { mac: None }
            }
        }

        impl Prf for $name {
            fn set_key(&mut self, key: &[u8]) {
                // HMAC accepts any key length (oversized keys are hashed
                // down internally), so this never fails in practice.
                self.mac = Some(
                    Hmac::<$digest>::new_from_slice(key).expect("HMAC accepts any key length"),
                );
            }

            fn prf(&mut self, seed: &[u8]) -> Vec<u8> {
                let mut mac = self.mac.clone().expect("set_key must be called before prf");
                mac.update(seed);
                mac.finalize().into_bytes().to_vec()
            }

            fn block_size(&self) -> usize {
                <$digest as Digest>::output_size()
            }

            fn key_size(&self) -> usize {
                <$digest as Digest>::output_size()
            }
        }
    };
}

hmac_prf!(HmacMd5Prf, Md5);
hmac_prf!(HmacSha1Prf, Sha1);
hmac_prf!(HmacSha256Prf, Sha256);
hmac_prf!(HmacSha384Prf, Sha384);
hmac_prf!(HmacSha512Prf, Sha512);

impl Prf for AesXcbcPrf {
    fn set_key(&mut self, key: &[u8]) {
        AesXcbcPrf::set_key(self, key)
    }

    fn prf(&mut self, seed: &[u8]) -> Vec<u8> {
        AesXcbcPrf::prf(self, seed)
    }

    fn block_size(&self) -> usize {
        16
    }

    fn key_size(&self) -> usize {
        16
    }
}
