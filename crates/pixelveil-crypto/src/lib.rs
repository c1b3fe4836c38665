//! # Pixelveil crypto
//! Key derivation, the payload cipher and key files used by `pixelveil-core`.
//!
//! ```rust
//! use pixelveil_crypto::{cipher, KeyMaterial};
//!
//! let (_salt, keys) = KeyMaterial::generate("correct horse battery staple").unwrap();
//! let envelope = cipher::encrypt(b"secret message", keys.cipher_key());
//!
//! assert_eq!(
//!     cipher::decrypt(&envelope, keys.cipher_key()).unwrap(),
//!     b"secret message"
//! );
//! ```

pub mod cipher;
pub mod error;
pub mod kdf;
pub mod key_file;

pub use crate::cipher::CipherEnvelope;
pub use crate::error::CryptoError;
pub use crate::kdf::{derive, derive_with, KdfParams, KeyMaterial, Salt};
pub use crate::key_file::KeyFileFormat;

pub type Result<T> = std::result::Result<T, CryptoError>;
