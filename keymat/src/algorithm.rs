//! Algorithm identifiers and the "AlgorithmMap" lookups RFC 2409 key
//! derivation depends on: integrity→PRF, integrity→hash, and the
//! per-PRF fixed-key-length adjustment.
//!
//! Numeric values follow the IKEv2 transform-ID registries (RFC 7296,
//! RFC 3526, RFC 8031) since IKEv1 and IKEv2 share the same integrity,
//! PRF and DH-group identifier space in practice; this crate uses them
//! purely as stable `u16` tags, not as wire values (wire encoding is out
//! of scope, see spec.md §1).

/// A transform type a [`crate::proposal::Proposal`] can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformType {
    Encryption,
    Integrity,
    PseudoRandomFunction,
    DiffieHellmanGroup,
}

/// Negotiated integrity (authentication) algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityAlgorithm {
    HmacMd5_96 = 1,
    HmacSha1_96 = 2,
    AesXcbc96 = 5,
    HmacSha2_256_128 = 12,
    HmacSha2_384_192 = 13,
    HmacSha2_512_256 = 14,
}

impl IntegrityAlgorithm {
    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            1 => Some(Self::HmacMd5_96),
            2 => Some(Self::HmacSha1_96),
            5 => Some(Self::AesXcbc96),
            12 => Some(Self::HmacSha2_256_128),
            13 => Some(Self::HmacSha2_384_192),
            14 => Some(Self::HmacSha2_512_256),
            _ => None,
        }
    }
}

/// Negotiated pseudo-random function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrfAlgorithm {
    HmacMd5 = 1,
    HmacSha1 = 2,
    Aes128Xcbc = 4,
    HmacSha2_256 = 5,
    HmacSha2_384 = 6,
    HmacSha2_512 = 7,
}

impl PrfAlgorithm {
    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            1 => Some(Self::HmacMd5),
            2 => Some(Self::HmacSha1),
            4 => Some(Self::Aes128Xcbc),
            5 => Some(Self::HmacSha2_256),
            6 => Some(Self::HmacSha2_384),
            7 => Some(Self::HmacSha2_512),
            _ => None,
        }
    }
}

/// Hash primitive used for Phase-1/Phase-2 IV generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

/// Negotiated encryption (block cipher) algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionAlgorithm {
    TripleDesCbc = 3,
    AesCbc = 12,
}

impl EncryptionAlgorithm {
    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            3 => Some(Self::TripleDesCbc),
            12 => Some(Self::AesCbc),
            _ => None,
        }
    }
}

/// Diffie-Hellman group identifier (RFC 2409 Appendix E / RFC 3526 / RFC 8031).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhGroup {
    Modp768 = 1,
    Modp1024 = 2,
    Modp1536 = 5,
    Modp2048 = 14,
    Curve25519 = 31,
}

/// Converts a negotiated integrity algorithm to its PRF counterpart.
///
/// Mirrors `keymat_v1.c::auth_to_prf`.
pub fn auth_to_prf(alg: IntegrityAlgorithm) -> Option<PrfAlgorithm> {
    match alg {
        IntegrityAlgorithm::HmacSha1_96 => Some(PrfAlgorithm::HmacSha1),
        IntegrityAlgorithm::HmacSha2_256_128 => Some(PrfAlgorithm::HmacSha2_256),
        IntegrityAlgorithm::HmacSha2_384_192 => Some(PrfAlgorithm::HmacSha2_384),
        IntegrityAlgorithm::HmacSha2_512_256 => Some(PrfAlgorithm::HmacSha2_512),
        IntegrityAlgorithm::HmacMd5_96 => Some(PrfAlgorithm::HmacMd5),
        IntegrityAlgorithm::AesXcbc96 => Some(PrfAlgorithm::Aes128Xcbc),
    }
}

/// Converts a negotiated integrity algorithm to the hash used for IV
/// generation. Mirrors `keymat_v1.c::auth_to_hash` — note AES-XCBC has no
/// hash counterpart and therefore no mapping.
pub fn auth_to_hash(alg: IntegrityAlgorithm) -> Option<HashAlgorithm> {
    match alg {
        IntegrityAlgorithm::HmacSha1_96 => Some(HashAlgorithm::Sha1),
        IntegrityAlgorithm::HmacSha2_256_128 => Some(HashAlgorithm::Sha256),
        IntegrityAlgorithm::HmacSha2_384_192 => Some(HashAlgorithm::Sha384),
        IntegrityAlgorithm::HmacSha2_512_256 => Some(HashAlgorithm::Sha512),
        IntegrityAlgorithm::HmacMd5_96 => Some(HashAlgorithm::Md5),
        IntegrityAlgorithm::AesXcbc96 => None,
    }
}

/// Truncates `key` in place to the fixed length a PRF expects, for PRFs
/// that do not accept variable-length keys.
///
/// Mirrors `keymat_v1.c::adjust_keylen`: RFC 4434 defines variable-length
/// keys for AES-XCBC in general, but RFC 3664 fixes the key to 16 bytes
/// for its use in IKE key derivation, so that semantics applies here.
pub fn adjust_keylen(alg: PrfAlgorithm, key: &mut Vec<u8>) {
    if alg == PrfAlgorithm::Aes128Xcbc && key.len() > 16 {
        key.truncate(16);
    }
}
