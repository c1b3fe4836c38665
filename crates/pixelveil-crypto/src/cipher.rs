//! AES-256-CBC with PKCS7 padding.
//!
//! The mode gives confidentiality only. There is no authentication tag, so a
//! flipped ciphertext bit decrypts to different bytes without any error as
//! long as the padding still validates.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes256;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::CryptoError;
use crate::kdf::CipherKey;
use crate::Result;

pub const IV_LEN: usize = 16;
pub const BLOCK_LEN: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// IV and ciphertext of one encrypted message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherEnvelope {
    pub iv: [u8; IV_LEN],
    pub ciphertext: Vec<u8>,
}

impl CipherEnvelope {
    /// `iv ‖ ciphertext`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(IV_LEN + self.ciphertext.len());
        bytes.extend_from_slice(&self.iv);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < IV_LEN + BLOCK_LEN || (bytes.len() - IV_LEN) % BLOCK_LEN != 0 {
            return Err(CryptoError::InvalidEnvelope(bytes.len()));
        }
        let (iv, ciphertext) = bytes.split_at(IV_LEN);
        let mut envelope = Self {
            iv: [0u8; IV_LEN],
            ciphertext: ciphertext.to_vec(),
        };
        envelope.iv.copy_from_slice(iv);

        Ok(envelope)
    }

    /// Size of the ciphertext PKCS7 produces for a plaintext of `plaintext_len` bytes
    pub fn ciphertext_len(plaintext_len: usize) -> usize {
        (plaintext_len / BLOCK_LEN + 1) * BLOCK_LEN
    }
}

/// encrypts with a fresh random IV, never reuse an envelope's IV for another message
pub fn encrypt(plaintext: &[u8], key: &CipherKey) -> CipherEnvelope {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    encrypt_with_iv(plaintext, key, iv)
}

fn encrypt_with_iv(plaintext: &[u8], key: &CipherKey, iv: [u8; IV_LEN]) -> CipherEnvelope {
    let ciphertext =
        Aes256CbcEnc::new(key.into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    CipherEnvelope { iv, ciphertext }
}

pub fn decrypt(envelope: &CipherEnvelope, key: &CipherKey) -> Result<Vec<u8>> {
    if envelope.ciphertext.is_empty() || envelope.ciphertext.len() % BLOCK_LEN != 0 {
        return Err(CryptoError::DecryptionError);
    }

    Aes256CbcDec::new(key.into(), &envelope.iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(&envelope.ciphertext)
        .map_err(|_| CryptoError::DecryptionError)
}

/// decrypts and insists on UTF-8 text
pub fn decrypt_text(envelope: &CipherEnvelope, key: &CipherKey) -> Result<String> {
    let plaintext = decrypt(envelope, key)?;

    Ok(String::from_utf8(plaintext)?)
}
