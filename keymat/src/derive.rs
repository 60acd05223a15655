//! `derive_ike_keys`: the RFC 2409 §5 SKEYID derivation chain, and the
//! RFC 2409 Appendix B expansion that follows it when SKEYID_e is
//! shorter than the negotiated cipher's key.
//!
//! A direct behavioral port of `keymat_v1.c::derive_ike_keys` /
//! `::expand_skeyid_e`, generalized from strongSwan's single hard-wired
//! registry lookup to the injected [`CryptoRegistry`] this crate uses
//! throughout.

use log::{debug, trace};

use crate::algorithm::{self, EncryptionAlgorithm, PrfAlgorithm, TransformType};
use crate::dh::DiffieHellman;
use crate::errors::DerivationError;
use crate::hasher::Hasher;
use crate::prf::Prf;
use crate::proposal::Proposal;
use crate::registry::CryptoRegistry;
use crate::secret::{secret, SecretBytes};

/// Which side of the exchange this key material belongs to. Only
/// matters for which public value is "ours" when building the initial
/// chained IV; cookie and nonce ordering is always initiator-first
/// regardless of role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Initiator,
    Responder,
}

/// The authentication method negotiated for this Phase-1 SA. Only
/// [`AuthClass::PreSharedKey`] is implemented; see spec.md §9 — the
/// other three RFC 2409 classes all require signature verification or
/// public-key encryption machinery out of scope here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthClass {
    PreSharedKey,
    DigitalSignature,
    PublicKeyEncryption,
    RevisedPublicKeyEncryption,
}

/// The output of a completed SKEYID derivation.
pub struct DerivedKeys {
    pub skeyid: SecretBytes,
    pub skeyid_d: SecretBytes,
    pub skeyid_a: SecretBytes,
    pub skeyid_e: SecretBytes,
    pub encryption_algorithm: EncryptionAlgorithm,
    pub initial_iv: Vec<u8>,
    /// The Phase-1 hasher, kept alive beyond derivation: every Phase-2
    /// slot's initial IV (`H(phase1_iv.iv | mid_be32)`, see
    /// [`crate::ivchain::IvChain`]) is computed with the same hash this
    /// SA negotiated, not recomputed from scratch.
    pub hasher: Box<dyn Hasher>,
}

fn resolve_prf(proposal: &dyn Proposal) -> Option<PrfAlgorithm> {
    if let Some((id, _)) = proposal.get_algorithm(TransformType::PseudoRandomFunction) {
        return PrfAlgorithm::from_id(id);
    }
    let (integrity_id, _) = proposal.get_algorithm(TransformType::Integrity)?;
    let integrity = algorithm::IntegrityAlgorithm::from_id(integrity_id)?;
    algorithm::auth_to_prf(integrity)
}

fn resolve_hash(proposal: &dyn Proposal) -> Option<algorithm::HashAlgorithm> {
    let (integrity_id, _) = proposal.get_algorithm(TransformType::Integrity)?;
    let integrity = algorithm::IntegrityAlgorithm::from_id(integrity_id)?;
    algorithm::auth_to_hash(integrity)
}

fn cipher_block_size(alg: EncryptionAlgorithm) -> usize {
    match alg {
        EncryptionAlgorithm::TripleDesCbc => 8,
        EncryptionAlgorithm::AesCbc => 16,
    }
}

fn cipher_key_size(alg: EncryptionAlgorithm, key_bits: Option<u16>) -> usize {
    match alg {
        EncryptionAlgorithm::TripleDesCbc => 24,
        EncryptionAlgorithm::AesCbc => (key_bits.unwrap_or(128) / 8) as usize,
    }
}

/// RFC 2409 Appendix B: if `skeyid_e` (the PRF's natural output length)
/// is shorter than the cipher's required key length, repeatedly feed
/// the PRF's own output back into itself — `K1 = prf(SKEYID_e, 0)`,
/// `K2 = prf(SKEYID_e, K1)`, … — and concatenate until there is enough
/// material, then truncate to the exact length needed.
pub fn expand_skeyid_e(prf: &mut dyn Prf, skeyid_e: &[u8], needed: usize) -> SecretBytes {
    if skeyid_e.len() >= needed {
        return secret(skeyid_e[..needed].to_vec());
    }

    prf.set_key(skeyid_e);
    let mut block = prf.prf(&[0u8]);
    let mut expanded = block.clone();
    while expanded.len() < needed {
        block = prf.prf(&block);
        expanded.extend_from_slice(&block);
    }
    expanded.truncate(needed);
    secret(expanded)
}

/// Performs the full RFC 2409 §5 SKEYID derivation chain for a
/// pre-shared-key Phase-1 SA, given a completed Diffie-Hellman exchange
/// and the negotiated algorithms.
#[allow(clippy::too_many_arguments)]
pub fn derive_ike_keys(
    registry: &dyn CryptoRegistry,
    proposal: &dyn Proposal,
    dh: &dyn DiffieHellman,
    role: Role,
    auth: AuthClass,
    psk: Option<&[u8]>,
    nonce_i: &[u8],
    nonce_r: &[u8],
    cookie_i: &[u8],
    cookie_r: &[u8],
    peer_dh_public: &[u8],
) -> Result<DerivedKeys, DerivationError> {
    if auth != AuthClass::PreSharedKey {
        debug!("authentication class {:?} not supported", auth);
        return Err(DerivationError::AuthClassUnsupported);
    }
    let psk = psk.ok_or_else(|| {
        debug!("pre-shared key authentication selected but no key supplied");
        DerivationError::MissingPsk
    })?;

    let prf_alg = resolve_prf(proposal).ok_or_else(|| {
        debug!("no pseudo-random function selected");
        DerivationError::NoPrfSelected
    })?;
    let mut prf = registry.create_prf(prf_alg).ok_or_else(|| {
        debug!("pseudo-random function {:?} not supported", prf_alg);
        DerivationError::PrfUnavailable
    })?;
    if prf.block_size() < prf.key_size() {
        debug!(
            "expansion of pseudo-random function {:?} output not supported",
            prf_alg
        );
        return Err(DerivationError::PrfExpansionRequired);
    }

    let shared_secret = dh.shared_secret()?;
    trace!("shared Diffie-Hellman secret {:x?}", &shared_secret[..]);

    let mut psk_key = secret(psk.to_vec());
    algorithm::adjust_keylen(prf_alg, &mut psk_key);
    prf.set_key(&psk_key);
    let mut nonces = Vec::with_capacity(nonce_i.len() + nonce_r.len());
    nonces.extend_from_slice(nonce_i);
    nonces.extend_from_slice(nonce_r);
    let mut skeyid = secret(prf.prf(&nonces));
    algorithm::adjust_keylen(prf_alg, &mut skeyid);
    trace!("SKEYID {:x?}", &skeyid[..]);

    prf.set_key(&skeyid);

    let mut seed_d = secret(Vec::with_capacity(
        shared_secret.len() + cookie_i.len() + cookie_r.len() + 1,
    ));
    seed_d.extend_from_slice(&shared_secret);
    seed_d.extend_from_slice(cookie_i);
    seed_d.extend_from_slice(cookie_r);
    seed_d.push(0x00);
    let skeyid_d = secret(prf.prf(&seed_d));
    trace!("SKEYID_d {:x?}", &skeyid_d[..]);

    let mut seed_a = secret(Vec::with_capacity(skeyid_d.len() + seed_d.len()));
    seed_a.extend_from_slice(&skeyid_d);
    seed_a.extend_from_slice(&shared_secret);
    seed_a.extend_from_slice(cookie_i);
    seed_a.extend_from_slice(cookie_r);
    seed_a.push(0x01);
    let skeyid_a = secret(prf.prf(&seed_a));
    trace!("SKEYID_a {:x?}", &skeyid_a[..]);

    let mut seed_e = secret(Vec::with_capacity(skeyid_a.len() + seed_d.len()));
    seed_e.extend_from_slice(&skeyid_a);
    seed_e.extend_from_slice(&shared_secret);
    seed_e.extend_from_slice(cookie_i);
    seed_e.extend_from_slice(cookie_r);
    seed_e.push(0x02);
    let skeyid_e_raw = secret(prf.prf(&seed_e));
    trace!("SKEYID_e (pre-expansion) {:x?}", &skeyid_e_raw[..]);

    let (enc_id, enc_key_bits) = proposal
        .get_algorithm(TransformType::Encryption)
        .ok_or_else(|| {
            debug!("no encryption algorithm selected");
            DerivationError::NoEncryptionSelected
        })?;
    let encryption_algorithm = EncryptionAlgorithm::from_id(enc_id).ok_or_else(|| {
        debug!("encryption algorithm {} not supported", enc_id);
        DerivationError::CipherUnavailable
    })?;
    let key_bytes_needed = cipher_key_size(encryption_algorithm, enc_key_bits);
    let skeyid_e = expand_skeyid_e(prf.as_mut(), &skeyid_e_raw, key_bytes_needed);
    trace!("encryption key Ka {:x?}", &skeyid_e[..]);

    let hash_alg = resolve_hash(proposal).ok_or_else(|| {
        debug!("no hash algorithm selected");
        DerivationError::NoHashSelected
    })?;
    let hasher = registry.create_hasher(hash_alg).ok_or_else(|| {
        debug!("hash algorithm {:?} not supported", hash_alg);
        DerivationError::HashUnavailable
    })?;
    let my_public = dh.my_public_value();
    let (initiator_public, responder_public): (&[u8], &[u8]) = match role {
        Role::Initiator => (&my_public, peer_dh_public),
        Role::Responder => (peer_dh_public, &my_public),
    };
    let mut iv_seed = Vec::with_capacity(initiator_public.len() + responder_public.len());
    iv_seed.extend_from_slice(initiator_public);
    iv_seed.extend_from_slice(responder_public);
    let mut initial_iv = hasher.hash(&iv_seed);
    initial_iv.truncate(cipher_block_size(encryption_algorithm));
    trace!("initial IV {:x?}", &initial_iv[..]);

    Ok(DerivedKeys {
        skeyid,
        skeyid_d,
        skeyid_a,
        skeyid_e,
        encryption_algorithm,
        initial_iv,
        hasher,
    })
}
