//! # Pixelveil Core API
//!
//! Hides encrypted text in the least significant bits of PNG images. Two keys,
//! both derived from one password, are involved:
//! - the cipher key encrypts the text with AES-256-CBC
//! - the sequence seed decides which pixel, channel and bit carry each payload bit
//!
//! # Usage Examples
//!
//! ## Hide a message inside an image
//!
//! ```rust
//! use pixelveil_core::{CarrierImage, SequenceOptions};
//! use pixelveil_crypto::KeyMaterial;
//!
//! let (salt, keys) = KeyMaterial::generate("SuperSecret42").expect("Failed to derive keys");
//! let carrier = CarrierImage::filled(64, 64, [12, 34, 56, 255]).expect("Invalid carrier");
//!
//! let secret_image = pixelveil_core::hide(&carrier, "Hello, World!", &keys, &SequenceOptions::default())
//!     .expect("Failed to hide message in image");
//!
//! assert_ne!(secret_image, carrier);
//! ```
//!
//! ## Extract a message from an image
//!
//! ```rust
//! use pixelveil_core::{CarrierImage, SequenceOptions};
//! use pixelveil_crypto::KeyMaterial;
//!
//! let (_, keys) = KeyMaterial::generate("SuperSecret42").expect("Failed to derive keys");
//! let carrier = CarrierImage::filled(64, 64, [12, 34, 56, 255]).expect("Invalid carrier");
//! let secret_image = pixelveil_core::hide(&carrier, "Hello, World!", &keys, &SequenceOptions::default())
//!     .expect("Failed to hide message in image");
//!
//! let message = pixelveil_core::api::extract::prepare()
//!     .with_image(secret_image)
//!     .with_keys(keys)
//!     .execute()
//!     .expect("Failed to extract message from image");
//!
//! assert_eq!(message, "Hello, World!");
//! ```

#![warn(clippy::redundant_else)]

pub mod api;
pub mod cancel;
pub mod codec;
pub mod error;
pub mod media;
pub mod mnemonic;
pub mod payload;
pub mod result;
pub mod sequence;

use log::debug;
use pixelveil_crypto::{cipher, KeyMaterial};

pub use crate::cancel::CancellationToken;
pub use crate::error::PixelveilError;
pub use crate::media::CarrierImage;
pub use crate::result::Result;
pub use crate::sequence::{Channel, ChannelSelection, PixelLocation, PixelSequence, SequenceOptions};

/// Encrypts `text` and hides it in a copy of `carrier`
pub fn hide(
    carrier: &CarrierImage,
    text: &str,
    keys: &KeyMaterial,
    options: &SequenceOptions,
) -> Result<CarrierImage> {
    hide_cancellable(carrier, text, keys, options, &CancellationToken::default())
}

pub fn hide_cancellable(
    carrier: &CarrierImage,
    text: &str,
    keys: &KeyMaterial,
    options: &SequenceOptions,
    cancel: &CancellationToken,
) -> Result<CarrierImage> {
    let (width, height) = carrier.dimensions();
    let required_bits = codec::required_bits(text.len());
    let available_bits = codec::capacity(width, height);
    if required_bits > available_bits {
        return Err(PixelveilError::PayloadTooLarge {
            required_bits,
            available_bits,
        });
    }
    debug!("Hiding {} bytes of text in a {width}x{height} carrier", text.len());

    let envelope = cipher::encrypt(text.as_bytes(), keys.cipher_key());
    let bitstream = payload::encode(&envelope);
    let sequence =
        sequence::generate_cancellable(keys.sequence_seed(), width, height, options, cancel)?;

    codec::embed_cancellable(carrier, &bitstream, &sequence, cancel)
}

/// Recovers the text [`hide`] put into `carrier` with the same keys and options
pub fn extract(
    carrier: &CarrierImage,
    keys: &KeyMaterial,
    options: &SequenceOptions,
) -> Result<String> {
    extract_cancellable(carrier, keys, options, &CancellationToken::default())
}

pub fn extract_cancellable(
    carrier: &CarrierImage,
    keys: &KeyMaterial,
    options: &SequenceOptions,
    cancel: &CancellationToken,
) -> Result<String> {
    let (width, height) = carrier.dimensions();
    let sequence =
        sequence::generate_cancellable(keys.sequence_seed(), width, height, options, cancel)?;
    let frame = codec::extract_with(carrier, &sequence, payload::is_frame_byte, cancel)?;
    let envelope = payload::decode(&frame)?;

    Ok(cipher::decrypt_text(&envelope, keys.cipher_key())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> KeyMaterial {
        KeyMaterial::from_parts([0x42; 32], *b"sequence seed 16")
    }

    #[test]
    fn hides_and_extracts() {
        let carrier = CarrierImage::filled(40, 30, [128, 64, 32, 255]).unwrap();
        let options = SequenceOptions::default();

        let stego = hide(&carrier, "Hello World!", &keys(), &options).unwrap();

        assert_eq!(extract(&stego, &keys(), &options).unwrap(), "Hello World!");
    }

    #[test]
    fn too_small_carriers_are_rejected_before_anything_happens() {
        let carrier = CarrierImage::filled(4, 4, [0, 0, 0, 255]).unwrap();

        match hide(&carrier, "hi", &keys(), &SequenceOptions::default()) {
            Err(PixelveilError::PayloadTooLarge {
                required_bits: 360,
                available_bits: 16,
            }) => (),
            other => panic!("expected PayloadTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn wrong_cipher_key_does_not_reveal_the_text() {
        let carrier = CarrierImage::filled(40, 30, [128, 64, 32, 255]).unwrap();
        let options = SequenceOptions::default();
        let stego = hide(&carrier, "Hello World!", &keys(), &options).unwrap();
        let other_cipher_key = KeyMaterial::from_parts([0x43; 32], *b"sequence seed 16");

        match extract(&stego, &other_cipher_key, &options) {
            Err(PixelveilError::DecryptionFailure(_)) => (),
            Ok(text) => assert_ne!(text, "Hello World!"),
            Err(e) => panic!("unexpected error {e}"),
        }
    }

    #[test]
    fn options_must_match() {
        let carrier = CarrierImage::filled(40, 30, [128, 64, 32, 255]).unwrap();
        let stego = hide(&carrier, "Hello World!", &keys(), &SequenceOptions::default()).unwrap();
        let rotating = SequenceOptions {
            channels: ChannelSelection::Rotating,
            ..SequenceOptions::default()
        };

        assert!(matches!(
            extract(&stego, &keys(), &rotating),
            Err(PixelveilError::NoHiddenPayload)
        ));
    }
}
