pub use argon2::Error as Argon2Error;
use std::string::FromUtf8Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Key derivation error")]
    KeyDerivationError(Argon2Error),

    #[error("Key derivation parameter error")]
    KeyDerivationParamError(Argon2Error),

    /// PBKDF2 was asked to run with fewer rounds than the policy allows
    #[error("Key derivation needs at least {minimum} iterations, got {iterations}")]
    TooFewIterations { iterations: u32, minimum: u32 },

    #[error("Salt must be 16 bytes, got {0}")]
    InvalidSalt(usize),

    #[error("Key expansion error")]
    KeyExpansionError,

    /// Wrong key, corrupted ciphertext or a padding mismatch, CBC cannot tell them apart
    #[error("Decryption error")]
    DecryptionError,

    /// Decrypted bytes were expected to be text
    #[error("Decrypted data is not valid UTF-8")]
    InvalidUtf8(#[from] FromUtf8Error),

    #[error("Cipher envelope of {0} bytes is malformed")]
    InvalidEnvelope(usize),

    #[error("Invalid key file: {0}")]
    InvalidKeyFile(&'static str),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}
