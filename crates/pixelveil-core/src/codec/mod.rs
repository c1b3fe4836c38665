//! Embeds a delimited bitstream along a [`PixelSequence`] and reads it back.

pub mod decoder;
pub mod encoder;

use std::io::{ErrorKind, Write};

use byteorder::ReadBytesExt;
use log::{debug, error, warn};

use crate::cancel::CancellationToken;
use crate::error::PixelveilError;
use crate::media::CarrierImage;
use crate::payload::{self, DELIMITER};
use crate::result::Result;
use crate::sequence::PixelSequence;

pub use decoder::SequenceDecoder;
pub use encoder::SequenceEncoder;

/// bits a carrier of the given dimensions can hold, one per pixel
pub fn capacity(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// bits needed to hide a plaintext of `plaintext_len` bytes
pub fn required_bits(plaintext_len: usize) -> usize {
    payload::framed_len(plaintext_len) * 8
}

pub fn embed(
    carrier: &CarrierImage,
    bitstream: &[u8],
    sequence: &PixelSequence,
) -> Result<CarrierImage> {
    embed_cancellable(carrier, bitstream, sequence, &CancellationToken::default())
}

/// Returns a copy of `carrier` with `bitstream` written along `sequence`.
///
/// Nothing is written when the bitstream does not fit, and a cancelled run
/// never hands out a partially written image.
pub fn embed_cancellable(
    carrier: &CarrierImage,
    bitstream: &[u8],
    sequence: &PixelSequence,
    cancel: &CancellationToken,
) -> Result<CarrierImage> {
    ensure_sequence_fits(carrier, sequence)?;

    let required_bits = bitstream.len() * 8;
    let available_bits = sequence.capacity_bits();
    if required_bits > available_bits {
        warn!("Payload of {required_bits} bits does not fit into {available_bits} bits");
        return Err(PixelveilError::PayloadTooLarge {
            required_bits,
            available_bits,
        });
    }
    debug!("Embedding {required_bits} of {available_bits} available bits");

    let mut stego = carrier.clone();
    {
        let mut encoder = SequenceEncoder::new(stego.pixels_mut(), sequence);
        for line in bitstream.chunks(line_bytes(carrier)) {
            cancel.check()?;
            encoder.write_all(line).map_err(|e| {
                error!("Error embedding payload: {e}, kind {}", e.kind());
                match e.kind() {
                    ErrorKind::WriteZero => PixelveilError::PayloadTooLarge {
                        required_bits,
                        available_bits,
                    },
                    _ => PixelveilError::ImageEncodingError,
                }
            })?;
        }
    }

    Ok(stego)
}

pub fn extract(carrier: &CarrierImage, sequence: &PixelSequence) -> Result<Vec<u8>> {
    extract_cancellable(carrier, sequence, &CancellationToken::default())
}

pub fn extract_cancellable(
    carrier: &CarrierImage,
    sequence: &PixelSequence,
    cancel: &CancellationToken,
) -> Result<Vec<u8>> {
    extract_with(carrier, sequence, |_| true, cancel)
}

/// Reads bytes until the delimiter and returns the bytes in front of it.
///
/// `accept` gets every byte before it is kept, a rejected byte ends the search
/// early with [`PixelveilError::NoHiddenPayload`].
pub fn extract_with<F>(
    carrier: &CarrierImage,
    sequence: &PixelSequence,
    accept: F,
    cancel: &CancellationToken,
) -> Result<Vec<u8>>
where
    F: Fn(u8) -> bool,
{
    ensure_sequence_fits(carrier, sequence)?;

    let line = line_bytes(carrier);
    let mut decoder = SequenceDecoder::new(carrier.pixels(), sequence);
    let mut bitstream = Vec::new();
    loop {
        if bitstream.len() % line == 0 {
            cancel.check()?;
        }
        let byte = match decoder.read_u8() {
            Ok(byte) => byte,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                warn!(
                    "No delimiter within {} bits, no hidden payload",
                    sequence.capacity_bits()
                );
                return Err(PixelveilError::NoHiddenPayload);
            }
            Err(e) => return Err(e.into()),
        };

        if byte == DELIMITER {
            debug!("Found delimiter after {} bytes", bitstream.len());
            return Ok(bitstream);
        }
        if !accept(byte) {
            warn!(
                "Unexpected byte {byte:#04x} after {} bytes, no hidden payload",
                bitstream.len()
            );
            return Err(PixelveilError::NoHiddenPayload);
        }
        bitstream.push(byte);
    }
}

/// payload bytes that cover one scan line of steps
fn line_bytes(carrier: &CarrierImage) -> usize {
    (carrier.width() as usize / 8).max(1)
}

fn ensure_sequence_fits(carrier: &CarrierImage, sequence: &PixelSequence) -> Result<()> {
    if carrier.dimensions() != (sequence.width(), sequence.height()) {
        error!(
            "Sequence for {}x{} used on a {}x{} carrier",
            sequence.width(),
            sequence.height(),
            carrier.width(),
            carrier.height()
        );
        return Err(PixelveilError::SequenceMismatch {
            sequence_width: sequence.width(),
            sequence_height: sequence.height(),
            width: carrier.width(),
            height: carrier.height(),
        });
    }

    Ok(())
}
