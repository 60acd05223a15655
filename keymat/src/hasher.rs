//! The `Hasher` capability trait: unkeyed digests used to generate the
//! Phase-1 dedicated IV (`H(g^xi | g^xr)`) and, for Phase-2, the
//! continuation hash over the previous phase's last ciphertext block and
//! message ID.

use digest::Digest;
use md5::Md5;
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};

/// An unkeyed cryptographic hash, used only for IV generation.
pub trait Hasher: Send {
    /// Hashes `data`, returning the digest's natural output length.
    fn hash(&self, data: &[u8]) -> Vec<u8>;

    /// The digest's output length in bytes.
    fn output_size(&self) -> usize;
}

macro_rules! digest_hasher {
    ($name:ident, $digest:ty) => {
        /// Digest-backed `Hasher`.
        pub struct $name;

        impl Hasher for $name {
            fn hash(&self, data: &[u8]) -> Vec<u8> {
                <$digest as Digest>::digest(data).to_vec()
            }

            fn output_size(&self) -> usize {
                <$digest as Digest>::output_size()
            }
        }
    };
}

digest_hasher!(Md5Hasher, Md5);
digest_hasher!(Sha1Hasher, Sha1);
digest_hasher!(Sha256Hasher, Sha256);
digest_hasher!(Sha384Hasher, Sha384);
digest_hasher!(Sha512Hasher, Sha512);
