//! Password based derivation of the two pixelveil keys.
//!
//! A password and a salt are stretched into a master secret (PBKDF2-HMAC-SHA256
//! by default, Argon2id on request). The master secret is then split with
//! HKDF-SHA256 into the cipher key and the sequence seed, each with its own
//! info string, so neither key tells anything about the other.

use std::fmt::{self, Debug, Formatter};

use argon2::{Algorithm, Argon2, ParamsBuilder, Version};
use hkdf::Hkdf;
use log::{debug, warn};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::CryptoError;
use crate::Result;

pub const SALT_LEN: usize = 16;
pub const CIPHER_KEY_LEN: usize = 32;
pub const SEQUENCE_SEED_LEN: usize = 16;

pub const MIN_PBKDF2_ITERATIONS: u32 = 10_000;
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 10_000;

const MASTER_KEY_LEN: usize = 32;
const WEAK_PASSWORD_CHARS: usize = 8;

const CIPHER_KEY_INFO: &[u8] = b"pixelveil/v1/cipher-key";
const SEQUENCE_SEED_INFO: &[u8] = b"pixelveil/v1/sequence-seed";

pub type CipherKey = [u8; CIPHER_KEY_LEN];
pub type SequenceSeed = [u8; SEQUENCE_SEED_LEN];

/// Random salt, generated once per key generation and stored next to the derived artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    pub fn random() -> Self {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        Self(salt)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }
}

impl From<[u8; SALT_LEN]> for Salt {
    fn from(value: [u8; SALT_LEN]) -> Self {
        Self(value)
    }
}

impl TryFrom<&[u8]> for Salt {
    type Error = CryptoError;

    fn try_from(value: &[u8]) -> Result<Self> {
        let salt: [u8; SALT_LEN] = value
            .try_into()
            .map_err(|_| CryptoError::InvalidSalt(value.len()))?;

        Ok(Self(salt))
    }
}

/// How the password gets stretched into the master secret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdfParams {
    /// PBKDF2 with HMAC-SHA256
    Pbkdf2 { iterations: u32 },
    /// Argon2id v0x13, memory cost in KiB
    Argon2id { t_cost: u32, m_cost_kib: u32 },
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::Pbkdf2 {
            iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

impl KdfParams {
    fn stretch(&self, password: &[u8], salt: &Salt) -> Result<Zeroizing<[u8; MASTER_KEY_LEN]>> {
        let mut master = Zeroizing::new([0u8; MASTER_KEY_LEN]);
        match *self {
            KdfParams::Pbkdf2 { iterations } => {
                if iterations < MIN_PBKDF2_ITERATIONS {
                    return Err(CryptoError::TooFewIterations {
                        iterations,
                        minimum: MIN_PBKDF2_ITERATIONS,
                    });
                }
                pbkdf2::pbkdf2_hmac::<Sha256>(password, salt.as_bytes(), iterations, &mut *master);
            }
            KdfParams::Argon2id { t_cost, m_cost_kib } => {
                let params = ParamsBuilder::new()
                    .t_cost(t_cost)
                    .m_cost(m_cost_kib)
                    .output_len(MASTER_KEY_LEN)
                    .build()
                    .map_err(CryptoError::KeyDerivationParamError)?;

                Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
                    .hash_password_into(password, salt.as_bytes(), &mut *master)
                    .map_err(CryptoError::KeyDerivationError)?;
            }
        }

        Ok(master)
    }
}

/// The key pair used by one hide or extract operation.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    cipher_key: CipherKey,
    sequence_seed: SequenceSeed,
}

impl Debug for KeyMaterial {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KeyMaterial {{ cipher_key: {}, sequence_seed: {} }}",
            "*".repeat(CIPHER_KEY_LEN),
            "*".repeat(SEQUENCE_SEED_LEN)
        )
    }
}

impl KeyMaterial {
    pub fn from_parts(cipher_key: CipherKey, sequence_seed: SequenceSeed) -> Self {
        Self {
            cipher_key,
            sequence_seed,
        }
    }

    /// Fresh salt plus the keys derived from it, the "generate key" step
    pub fn generate(password: &str) -> Result<(Salt, Self)> {
        let salt = Salt::random();
        let keys = derive(password, &salt)?;

        Ok((salt, keys))
    }

    pub fn cipher_key(&self) -> &CipherKey {
        &self.cipher_key
    }

    pub fn sequence_seed(&self) -> &SequenceSeed {
        &self.sequence_seed
    }
}

/// Empty or short passwords are accepted but should be discouraged by the caller.
pub fn is_weak_password(password: &str) -> bool {
    password.chars().count() < WEAK_PASSWORD_CHARS
}

/// derives the key pair with the default parameters
pub fn derive(password: &str, salt: &Salt) -> Result<KeyMaterial> {
    derive_with(password, salt, &KdfParams::default())
}

pub fn derive_with(password: &str, salt: &Salt, params: &KdfParams) -> Result<KeyMaterial> {
    if is_weak_password(password) {
        warn!(
            "Deriving keys from a weak password of {} characters",
            password.chars().count()
        );
    }
    debug!("Deriving key material with {params:?}");

    let master = params.stretch(password.as_bytes(), salt)?;
    let hkdf = Hkdf::<Sha256>::new(None, master.as_slice());

    let mut keys = KeyMaterial::from_parts([0u8; CIPHER_KEY_LEN], [0u8; SEQUENCE_SEED_LEN]);
    hkdf.expand(CIPHER_KEY_INFO, &mut keys.cipher_key)
        .map_err(|_| CryptoError::KeyExpansionError)?;
    hkdf.expand(SEQUENCE_SEED_INFO, &mut keys.sequence_seed)
        .map_err(|_| CryptoError::KeyExpansionError)?;

    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXED_SALT: [u8; SALT_LEN] = *b"pixelveil-salt!!";

    #[test]
    fn test_derivation_is_deterministic() {
        let salt = Salt::from(FIXED_SALT);
        let a = derive("hunter42hunter42", &salt).unwrap();
        let b = derive("hunter42hunter42", &salt).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_different_passwords_lead_to_different_keys() {
        let salt = Salt::from(FIXED_SALT);
        let a = derive("resistance is futile", &salt).unwrap();
        let b = derive("resistance is futile!", &salt).unwrap();

        assert_ne!(a.cipher_key(), b.cipher_key());
        assert_ne!(a.sequence_seed(), b.sequence_seed());
    }

    #[test]
    fn test_different_salts_lead_to_different_keys() {
        let a = derive("resistance is futile", &Salt::from(FIXED_SALT)).unwrap();
        let b = derive("resistance is futile", &Salt::from([7u8; SALT_LEN])).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn test_cipher_key_and_sequence_seed_are_separated() {
        let keys = derive("resistance is futile", &Salt::from(FIXED_SALT)).unwrap();

        assert_ne!(&keys.cipher_key()[..SEQUENCE_SEED_LEN], keys.sequence_seed());
        assert_ne!(&keys.cipher_key()[SEQUENCE_SEED_LEN..], keys.sequence_seed());
    }

    #[test]
    fn test_too_few_iterations_are_rejected() {
        let result = derive_with(
            "resistance is futile",
            &Salt::from(FIXED_SALT),
            &KdfParams::Pbkdf2 { iterations: 1_000 },
        );

        assert!(matches!(
            result,
            Err(CryptoError::TooFewIterations {
                iterations: 1_000,
                minimum: MIN_PBKDF2_ITERATIONS
            })
        ));
    }

    #[test]
    fn test_argon2id_derivation() {
        let salt = Salt::from(FIXED_SALT);
        let params = KdfParams::Argon2id {
            t_cost: 1,
            m_cost_kib: 64,
        };
        let a = derive_with("resistance is futile", &salt, &params).unwrap();
        let b = derive_with("resistance is futile", &salt, &params).unwrap();
        let pbkdf2 = derive("resistance is futile", &salt).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, pbkdf2);
    }

    #[test]
    fn test_invalid_argon2_params() {
        let result = derive_with(
            "resistance is futile",
            &Salt::from(FIXED_SALT),
            &KdfParams::Argon2id {
                t_cost: 0,
                m_cost_kib: 64,
            },
        );

        assert!(matches!(
            result,
            Err(CryptoError::KeyDerivationParamError(_))
        ));
    }

    #[test]
    fn test_empty_password_is_weak_but_allowed() {
        assert!(is_weak_password(""));
        assert!(is_weak_password("1234567"));
        assert!(!is_weak_password("12345678"));

        let keys = derive("", &Salt::from(FIXED_SALT)).unwrap();
        assert_ne!(keys.cipher_key(), &[0u8; CIPHER_KEY_LEN]);
    }

    #[test]
    fn test_generated_salt_reproduces_keys() {
        let (salt, keys) = KeyMaterial::generate("correct horse battery").unwrap();
        let again = derive("correct horse battery", &salt).unwrap();

        assert_eq!(keys, again);
        assert_ne!(salt, Salt::random());
    }

    #[test]
    fn test_salt_from_slice() {
        assert!(Salt::try_from(&FIXED_SALT[..]).is_ok());
        assert!(matches!(
            Salt::try_from(&FIXED_SALT[..15]),
            Err(CryptoError::InvalidSalt(15))
        ));
    }

    #[test]
    fn test_debug_does_not_leak_keys() {
        let keys = KeyMaterial::from_parts([0xab; CIPHER_KEY_LEN], [0xcd; SEQUENCE_SEED_LEN]);
        let printed = format!("{keys:?}");

        assert!(!printed.contains("171"));
        assert!(!printed.contains("ab"));
        assert!(printed.starts_with("KeyMaterial { cipher_key: ****"));
    }
}
