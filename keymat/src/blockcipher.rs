//! The `BlockCipherAlgo` capability trait and its AES/3DES
//! implementations, used by [`crate::facade::CipherFacade`] to drive CBC
//! encryption and decryption without committing to one concrete cipher.

use aes::{Aes128, Aes192, Aes256};
use cipher::generic_array::GenericArray;
use cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use des::TdesEde3;

/// A raw block cipher primitive, keyed and ready to encrypt or decrypt
/// single blocks. [`crate::facade::CipherFacade`] chains these into CBC
/// mode itself; this trait does not know about modes or padding.
pub trait BlockCipherAlgo: Send {
    /// The cipher's block size in bytes (also its IV size in CBC mode).
    fn block_size(&self) -> usize;

    /// The cipher's key length in bytes.
    fn key_size(&self) -> usize;

    fn encrypt_block(&self, block: &mut [u8]);

    fn decrypt_block(&self, block: &mut [u8]);
}

macro_rules! aes_cipher {
    ($name:ident, $aes:ty, $key_size:literal) => {
        /// AES block cipher, keyed for CBC use via [`crate::facade::CipherFacade`].
        pub struct $name {
            inner: $aes,
        }

        impl $name {
            pub fn new(key: &[u8]) -> Option<Self> {
                if key.len() != $key_size {
                    return None;
                }
                Some(Self {
                    inner: <$aes>::new_from_slice(key).ok()?,
                })
            }
        }

        impl BlockCipherAlgo for $name {
            fn block_size(&self) -> usize {
                16
            }

            fn key_size(&self) -> usize {
                $key_size
            }

            fn encrypt_block(&self, block: &mut [u8]) {
                let mut generic = GenericArray::clone_from_slice(block);
                self.inner.encrypt_block(&mut generic);
                block.copy_from_slice(&generic);
            }

            fn decrypt_block(&self, block: &mut [u8]) {
                let mut generic = GenericArray::clone_from_slice(block);
                self.inner.decrypt_block(&mut generic);
                block.copy_from_slice(&generic);
            }
        }
    };
}

aes_cipher!(Aes128Cbc, Aes128, 16);
aes_cipher!(Aes192Cbc, Aes192, 24);
aes_cipher!(Aes256Cbc, Aes256, 32);

/// 3DES (EDE, three independent keys), the IKEv1 default encryption
/// algorithm.
pub struct TripleDesCbc {
    inner: TdesEde3,
}

impl TripleDesCbc {
    pub fn new(key: &[u8]) -> Option<Self> {
        if key.len() != 24 {
            return None;
        }
        Some(Self {
            inner: TdesEde3::new_from_slice(key).ok()?,
        })
    }
}

impl BlockCipherAlgo for TripleDesCbc {
    fn block_size(&self) -> usize {
        8
    }

    fn key_size(&self) -> usize {
        24
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        let mut generic = GenericArray::clone_from_slice(block);
        self.inner.encrypt_block(&mut generic);
        block.copy_from_slice(&generic);
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        let mut generic = GenericArray::clone_from_slice(block);
        self.inner.decrypt_block(&mut generic);
        block.copy_from_slice(&generic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aes128_round_trips_a_block() {
        let key = [0x2bu8; 16];
        let cipher = Aes128Cbc::new(&key).unwrap();
        let mut block = [0x11u8; 16];
        let plain = block;
        cipher.encrypt_block(&mut block);
        assert_ne!(block, plain);
        cipher.decrypt_block(&mut block);
        assert_eq!(block, plain);
    }

    #[test]
    fn triple_des_rejects_wrong_key_length() {
        assert!(TripleDesCbc::new(&[0u8; 16]).is_none());
    }
}
