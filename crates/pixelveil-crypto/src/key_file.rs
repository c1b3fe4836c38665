//! Key files
//!
//! Two formats exist:
//! - plain: `hex(cipher_key)\nhex(sequence_seed)\n`, readable by anyone holding the file
//! - sealed: `salt(16) ‖ iv(16) ‖ ciphertext`, where the ciphertext decrypts with
//!   a key derived from a second password and the stored salt to
//!   `base64(cipher_key)|base64(sequence_seed)`

use std::fs;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use log::debug;
use zeroize::Zeroizing;

use crate::cipher::{decrypt, encrypt, CipherEnvelope, IV_LEN};
use crate::error::CryptoError;
use crate::kdf::{derive, CipherKey, KeyMaterial, Salt, SequenceSeed, SALT_LEN};
use crate::Result;

pub const KEY_PAIR_DELIMITER: char = '|';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFileFormat {
    PlainHex,
    Sealed,
}

pub fn to_plain_hex(keys: &KeyMaterial) -> String {
    format!(
        "{}\n{}\n",
        hex::encode(keys.cipher_key()),
        hex::encode(keys.sequence_seed())
    )
}

pub fn from_plain_hex(content: &str) -> Result<KeyMaterial> {
    let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());
    let cipher_key_hex = lines
        .next()
        .ok_or(CryptoError::InvalidKeyFile("cipher key is missing"))?;
    let sequence_seed_hex = lines
        .next()
        .ok_or(CryptoError::InvalidKeyFile("sequence seed is missing"))?;
    if lines.next().is_some() {
        return Err(CryptoError::InvalidKeyFile("unexpected trailing content"));
    }

    let mut cipher_key: Zeroizing<CipherKey> = Zeroizing::new([0u8; 32]);
    let mut sequence_seed: Zeroizing<SequenceSeed> = Zeroizing::new([0u8; 16]);
    hex::decode_to_slice(cipher_key_hex, &mut *cipher_key)
        .map_err(|_| CryptoError::InvalidKeyFile("cipher key is not 32 hex encoded bytes"))?;
    hex::decode_to_slice(sequence_seed_hex, &mut *sequence_seed)
        .map_err(|_| CryptoError::InvalidKeyFile("sequence seed is not 16 hex encoded bytes"))?;

    Ok(KeyMaterial::from_parts(*cipher_key, *sequence_seed))
}

/// Encrypts the key pair under `password`, a fresh salt is generated and stored in front.
pub fn seal(keys: &KeyMaterial, password: &str) -> Result<Vec<u8>> {
    let salt = Salt::random();
    let wrapping_keys = derive(password, &salt)?;
    let body = Zeroizing::new(format!(
        "{}{}{}",
        BASE64.encode(keys.cipher_key()),
        KEY_PAIR_DELIMITER,
        BASE64.encode(keys.sequence_seed())
    ));

    let envelope = encrypt(body.as_bytes(), wrapping_keys.cipher_key());
    let mut sealed = Vec::with_capacity(SALT_LEN + IV_LEN + envelope.ciphertext.len());
    sealed.extend_from_slice(salt.as_bytes());
    sealed.extend_from_slice(&envelope.to_bytes());

    Ok(sealed)
}

pub fn unseal(sealed: &[u8], password: &str) -> Result<KeyMaterial> {
    if sealed.len() < SALT_LEN {
        return Err(CryptoError::InvalidKeyFile("sealed key file is truncated"));
    }
    let (salt, envelope) = sealed.split_at(SALT_LEN);
    let salt = Salt::try_from(salt)?;
    let envelope = CipherEnvelope::from_bytes(envelope)
        .map_err(|_| CryptoError::InvalidKeyFile("sealed key file is truncated"))?;

    let wrapping_keys = derive(password, &salt)?;
    let body = Zeroizing::new(decrypt(&envelope, wrapping_keys.cipher_key())?);
    // a wrong password that happens to produce valid padding ends up here
    let body = std::str::from_utf8(&body).map_err(|_| CryptoError::DecryptionError)?;

    let (cipher_key, sequence_seed) = body
        .split_once(KEY_PAIR_DELIMITER)
        .ok_or(CryptoError::InvalidKeyFile("file does not contain both keys"))?;
    let cipher_key = decode_base64_key::<32>(cipher_key)?;
    let sequence_seed = decode_base64_key::<16>(sequence_seed)?;

    Ok(KeyMaterial::from_parts(*cipher_key, *sequence_seed))
}

fn decode_base64_key<const N: usize>(encoded: &str) -> Result<Zeroizing<[u8; N]>> {
    let decoded = Zeroizing::new(
        BASE64
            .decode(encoded.trim())
            .map_err(|_| CryptoError::InvalidKeyFile("key is not base64 encoded"))?,
    );
    if decoded.len() != N {
        return Err(CryptoError::InvalidKeyFile("key has the wrong length"));
    }
    let mut key = Zeroizing::new([0u8; N]);
    key.copy_from_slice(&decoded);

    Ok(key)
}

pub fn detect(content: &[u8]) -> KeyFileFormat {
    match std::str::from_utf8(content) {
        Ok(text) if from_plain_hex(text).is_ok() => KeyFileFormat::PlainHex,
        _ => KeyFileFormat::Sealed,
    }
}

/// Reads either format, a sealed file needs the password
pub fn load(content: &[u8], password: Option<&str>) -> Result<KeyMaterial> {
    match detect(content) {
        KeyFileFormat::PlainHex => {
            let text = std::str::from_utf8(content)
                .map_err(|_| CryptoError::InvalidKeyFile("plain key file is not text"))?;
            from_plain_hex(text)
        }
        KeyFileFormat::Sealed => {
            let password = password.ok_or(CryptoError::InvalidKeyFile(
                "a sealed key file needs a password",
            ))?;
            unseal(content, password)
        }
    }
}

pub fn load_from_file(path: impl AsRef<Path>, password: Option<&str>) -> Result<KeyMaterial> {
    let path = path.as_ref();
    debug!("Loading key file {path:?}");
    let content = fs::read(path)?;

    load(&content, password)
}

pub fn save_sealed(path: impl AsRef<Path>, keys: &KeyMaterial, password: &str) -> Result<()> {
    fs::write(path, seal(keys, password)?)?;

    Ok(())
}

pub fn save_plain_hex(path: impl AsRef<Path>, keys: &KeyMaterial) -> Result<()> {
    fs::write(path, to_plain_hex(keys))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_keys() -> KeyMaterial {
        let mut cipher_key = [0u8; 32];
        let mut sequence_seed = [0u8; 16];
        for (i, b) in cipher_key.iter_mut().enumerate() {
            *b = i as u8;
        }
        for (i, b) in sequence_seed.iter_mut().enumerate() {
            *b = 0xf0 | i as u8;
        }
        KeyMaterial::from_parts(cipher_key, sequence_seed)
    }

    #[test]
    fn test_plain_hex_format() {
        let text = to_plain_hex(&sample_keys());
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f")
        );
        assert_eq!(lines.next(), Some("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff"));
        assert_eq!(lines.next(), None);
        assert_eq!(from_plain_hex(&text).unwrap(), sample_keys());
    }

    #[test]
    fn test_plain_hex_tolerates_whitespace() {
        let text = "  000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f\r\nf0f1f2f3f4f5f6f7f8f9fafbfcfdfeff";

        assert_eq!(from_plain_hex(text).unwrap(), sample_keys());
    }

    #[test]
    fn test_plain_hex_rejects_garbage() {
        assert!(matches!(
            from_plain_hex(""),
            Err(CryptoError::InvalidKeyFile("cipher key is missing"))
        ));
        assert!(matches!(
            from_plain_hex("00ff\n00ff\n"),
            Err(CryptoError::InvalidKeyFile(_))
        ));
        let text = format!("{}extra\n", to_plain_hex(&sample_keys()));
        assert!(matches!(
            from_plain_hex(&text),
            Err(CryptoError::InvalidKeyFile("unexpected trailing content"))
        ));
    }

    #[test]
    fn test_seal_and_unseal() {
        let sealed = seal(&sample_keys(), "file password").unwrap();

        // salt, iv and a body of 44 + 1 + 24 base64 characters padded to 80 bytes
        assert_eq!(sealed.len(), 16 + 16 + 80);
        assert_eq!(detect(&sealed), KeyFileFormat::Sealed);
        assert_eq!(unseal(&sealed, "file password").unwrap(), sample_keys());
    }

    #[test]
    fn test_sealing_twice_uses_a_different_salt() {
        let a = seal(&sample_keys(), "file password").unwrap();
        let b = seal(&sample_keys(), "file password").unwrap();

        assert_ne!(a[..SALT_LEN], b[..SALT_LEN]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_unseal_with_wrong_password() {
        let sealed = seal(&sample_keys(), "file password").unwrap();

        match unseal(&sealed, "wrong password") {
            Err(CryptoError::DecryptionError) | Err(CryptoError::InvalidKeyFile(_)) => (),
            other => panic!("wrong password must not unseal, got {other:?}"),
        }
    }

    #[test]
    fn test_unseal_truncated() {
        let sealed = seal(&sample_keys(), "file password").unwrap();

        assert!(matches!(
            unseal(&sealed[..10], "file password"),
            Err(CryptoError::InvalidKeyFile(_))
        ));
        assert!(matches!(
            unseal(&sealed[..40], "file password"),
            Err(CryptoError::InvalidKeyFile(_))
        ));
    }

    #[test]
    fn test_load_detects_the_format() {
        let plain = to_plain_hex(&sample_keys());
        assert_eq!(detect(plain.as_bytes()), KeyFileFormat::PlainHex);
        assert_eq!(load(plain.as_bytes(), None).unwrap(), sample_keys());

        let sealed = seal(&sample_keys(), "pw").unwrap();
        assert!(matches!(
            load(&sealed, None),
            Err(CryptoError::InvalidKeyFile(_))
        ));
        assert_eq!(load(&sealed, Some("pw")).unwrap(), sample_keys());
    }

    #[test]
    fn test_files_on_disk() {
        let dir = tempdir().expect("Failed to create temporary directory");
        let sealed_path = dir.path().join("encryption-key.key");
        let plain_path = dir.path().join("encryption-key.txt");

        save_sealed(&sealed_path, &sample_keys(), "file password").unwrap();
        save_plain_hex(&plain_path, &sample_keys()).unwrap();

        assert_eq!(
            load_from_file(&sealed_path, Some("file password")).unwrap(),
            sample_keys()
        );
        assert_eq!(load_from_file(&plain_path, None).unwrap(), sample_keys());
        assert!(matches!(
            load_from_file(dir.path().join("missing.key"), None),
            Err(CryptoError::IoError(_))
        ));
    }
}
