//! `CipherFacade`: an authenticated-encryption-shaped wrapper over a
//! plain CBC block cipher.
//!
//! Mirrors the source's `private_aead_t`, which lets an IKEv1 keymat
//! implementation hand its caller the same `aead_t` shape IKEv2 uses,
//! by reporting `icv_size() == 0` and folding the IV into the
//! encrypt/decrypt calls instead of authenticating it. CBC chaining is
//! implemented directly against [`BlockCipherAlgo`] rather than via the
//! `cbc` crate's generic `Encryptor`/`Decryptor`, since those are
//! generic over a concrete cipher type and can't be driven through the
//! `Box<dyn BlockCipherAlgo>` the registry hands back.

use crate::blockcipher::BlockCipherAlgo;
use crate::errors::DerivationError;

/// CBC encryption/decryption over a negotiated block cipher, with no
/// authentication tag and no internally-generated IV — both are the
/// caller's responsibility via [`crate::ivchain::IvChain`], matching
/// IKEv1's chained-IV construction (RFC 2409 §5).
pub struct CipherFacade {
    cipher: Box<dyn BlockCipherAlgo>,
}

impl CipherFacade {
    pub fn new(cipher: Box<dyn BlockCipherAlgo>) -> Self {
        Self { cipher }
    }

    pub fn block_size(&self) -> usize {
        self.cipher.block_size()
    }

    pub fn key_size(&self) -> usize {
        self.cipher.key_size()
    }

    /// Always zero: this facade carries no integrity check value of its
    /// own, unlike a real AEAD construction.
    pub fn icv_size(&self) -> usize {
        0
    }

    /// Always zero: the IV is supplied to [`CipherFacade::encrypt`]/
    /// [`CipherFacade::decrypt`] directly rather than being generated
    /// and prefixed by this facade.
    pub fn iv_size(&self) -> usize {
        0
    }

    /// Encrypts `plaintext` in place under CBC mode with IV `iv`, both
    /// required to be exact multiples of [`CipherFacade::block_size`].
    /// Returns the last ciphertext block, the IV the caller chains into
    /// the next message via [`crate::ivchain::IvChain::update_iv`].
    pub fn encrypt(&self, iv: &[u8], plaintext: &mut [u8]) -> Result<Vec<u8>, DerivationError> {
        let block_size = self.cipher.block_size();
        if iv.len() != block_size || plaintext.len() % block_size != 0 || plaintext.is_empty() {
            return Err(DerivationError::CipherUnavailable);
        }

        let mut prev = iv.to_vec();
        for block in plaintext.chunks_mut(block_size) {
            for (b, p) in block.iter_mut().zip(prev.iter()) {
                *b ^= p;
            }
            self.cipher.encrypt_block(block);
            prev = block.to_vec();
        }
        Ok(prev)
    }

    /// Decrypts `ciphertext` in place under CBC mode with IV `iv`.
    /// Returns the last ciphertext block (as received, before
    /// decryption), the IV the caller chains forward, matching
    /// `encrypt`'s contract.
    pub fn decrypt(&self, iv: &[u8], ciphertext: &mut [u8]) -> Result<Vec<u8>, DerivationError> {
        let block_size = self.cipher.block_size();
        if iv.len() != block_size || ciphertext.len() % block_size != 0 || ciphertext.is_empty() {
            return Err(DerivationError::CipherUnavailable);
        }

        let next_iv = ciphertext[ciphertext.len() - block_size..].to_vec();
        let mut prev = iv.to_vec();
        for block in ciphertext.chunks_mut(block_size) {
            let current_ciphertext = block.to_vec();
            self.cipher.decrypt_block(block);
            for (b, p) in block.iter_mut().zip(prev.iter()) {
                *b ^= p;
            }
            prev = current_ciphertext;
        }
        Ok(next_iv)
    }
}
