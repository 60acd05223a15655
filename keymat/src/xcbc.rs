//! PRF-AES128-XCBC (RFC 3664 / RFC 4434), built directly on AES-128 block
//! encryption since no RustCrypto crate ships a ready-made XCBC-MAC/PRF
//! primitive.
//!
//! XCBC-MAC (RFC 3566 §4) derives three 128-bit subkeys from the input
//! key by AES-encrypting three fixed constants (`0x01`, `0x02`, `0x03`
//! repeated), then CBC-MACs the message under K1, zero-padding a final
//! partial block and XORing it with K3 (or, for a message whose length
//! is already a non-zero multiple of the block size, XORing the final
//! full block with K2 instead).

use aes::Aes128;
use cipher::generic_array::GenericArray;
use cipher::{BlockEncrypt, KeyInit};

const BLOCK: usize = 16;

fn subkey(key: &Aes128, constant: u8) -> [u8; BLOCK] {
    let mut generic = GenericArray::clone_from_slice(&[constant; BLOCK]);
    key.encrypt_block(&mut generic);
    let mut out = [0u8; BLOCK];
    out.copy_from_slice(&generic);
    out
}

fn xor_assign(block: &mut [u8; BLOCK], other: &[u8; BLOCK]) {
    for (b, o) in block.iter_mut().zip(other.iter()) {
        *b ^= o;
    }
}

fn encrypt_block(key: &Aes128, block: &mut [u8; BLOCK]) {
    let mut generic = GenericArray::clone_from_slice(block);
    key.encrypt_block(&mut generic);
    block.copy_from_slice(&generic);
}

/// PRF-AES128-XCBC: a fixed 128-bit-key, 128-bit-block keyed PRF.
pub struct AesXcbcPrf {
    k1: Option<Aes128>,
    k2: Option<[u8; BLOCK]>,
    k3: Option<[u8; BLOCK]>,
}

impl AesXcbcPrf {
    pub fn new() -> Self {
        Self {
            k1: None,
            k2: None,
            k3: None,
        }
    }

    pub fn set_key(&mut self, key: &[u8]) {
        // RFC 2409 key derivation truncates the PSK to 16 bytes before it
        // ever reaches this PRF (see `adjust_keylen`); zero-pad/truncate
        // defensively so any caller-supplied key of another length still
        // produces a well-defined (if non-conformant) result rather than
        // panicking.
        let mut k = [0u8; BLOCK];
        let n = key.len().min(BLOCK);
        k[..n].copy_from_slice(&key[..n]);
        let base = Aes128::new_from_slice(&k).expect("16-byte AES-128 key");

        self.k1 = Some(Aes128::new_from_slice(&subkey(&base, 0x01)).expect("16-byte AES-128 key"));
        self.k2 = Some(subkey(&base, 0x02));
        self.k3 = Some(subkey(&base, 0x03));
    }

    /// `prf(key, seed)` — RFC 3566 XCBC-MAC over `seed` of arbitrary
    /// length, returning one 128-bit block.
    pub fn prf(&mut self, seed: &[u8]) -> Vec<u8> {
        let k1 = self.k1.as_ref().expect("set_key must be called before prf");
        let k2 = self.k2.expect("set_key must be called before prf");
        let k3 = self.k3.expect("set_key must be called before prf");

        let full_blocks_if_padded = seed.len() / BLOCK;
        let last_is_full = !seed.is_empty() && seed.len() % BLOCK == 0;
        let num_blocks = if last_is_full {
            full_blocks_if_padded
        } else {
            full_blocks_if_padded + 1
        };

        let mut e = [0u8; BLOCK];
        for i in 0..num_blocks {
            let start = i * BLOCK;
            let mut block = [0u8; BLOCK];
            if i + 1 < num_blocks {
                block.copy_from_slice(&seed[start..start + BLOCK]);
            } else if last_is_full {
                block.copy_from_slice(&seed[start..start + BLOCK]);
                xor_assign(&mut block, &k2);
            } else {
                let remaining = &seed[start..];
                block[..remaining.len()].copy_from_slice(remaining);
                block[remaining.len()] = 0x80;
                xor_assign(&mut block, &k3);
            }
            xor_assign(&mut block, &e);
            encrypt_block(k1, &mut block);
            e = block;
        }
        e.to_vec()
    }
}
