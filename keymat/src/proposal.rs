//! The negotiated-algorithm lookup [`crate::derive::derive_ike_keys`]
//! consults to learn which PRF, cipher, and DH group a Phase-1 SA
//! settled on.

use crate::algorithm::TransformType;

/// A source of negotiated transform IDs, keyed by [`TransformType`].
///
/// Implemented by whatever holds the result of IKE SA payload
/// negotiation; this crate only needs read access to the outcome, not
/// the negotiation itself (see spec.md §1 Non-goals).
pub trait Proposal {
    /// Returns the negotiated transform ID and, where meaningful, its
    /// key length in bits (e.g. a variable-length AES key), for `kind`.
    fn get_algorithm(&self, kind: TransformType) -> Option<(u16, Option<u16>)>;
}

/// A fixed, literal proposal, for tests and for callers that already
/// resolved negotiation elsewhere and just need to hand the result in.
#[derive(Debug, Clone, Default)]
pub struct StaticProposal {
    encryption: Option<(u16, Option<u16>)>,
    integrity: Option<(u16, Option<u16>)>,
    prf: Option<(u16, Option<u16>)>,
    dh_group: Option<(u16, Option<u16>)>,
}

impl StaticProposal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encryption(mut self, id: u16, key_bits: Option<u16>) -> Self {
        self.encryption = Some((id, key_bits));
        self
    }

    pub fn with_integrity(mut self, id: u16) -> Self {
        self.integrity = Some((id, None));
        self
    }

    pub fn with_prf(mut self, id: u16) -> Self {
        self.prf = Some((id, None));
        self
    }

    pub fn with_dh_group(mut self, id: u16) -> Self {
        self.dh_group = Some((id, None));
        self
    }
}

impl Proposal for StaticProposal {
    fn get_algorithm(&self, kind: TransformType) -> Option<(u16, Option<u16>)> {
        match kind {
            TransformType::Encryption => self.encryption,
            TransformType::Integrity => self.integrity,
            TransformType::PseudoRandomFunction => self.prf,
            TransformType::DiffieHellmanGroup => self.dh_group,
        }
    }
}
