use std::io::{Read, Result};
use std::slice::Iter;

use bitstream_io::{BigEndian, BitWrite, BitWriter};

use crate::media::image::CHANNELS_PER_PIXEL;
use crate::sequence::{PixelLocation, PixelSequence};

/// Reads back what [`super::encoder::SequenceEncoder`] wrote, byte by byte.
///
/// Trailing steps that do not make up a whole byte are never returned.
pub struct SequenceDecoder<'a> {
    pixels: &'a [u8],
    width: usize,
    steps: Iter<'a, PixelLocation>,
}

impl<'a> SequenceDecoder<'a> {
    pub fn new(pixels: &'a [u8], sequence: &'a PixelSequence) -> Self {
        Self {
            pixels,
            width: sequence.width() as usize,
            steps: sequence.iter(),
        }
    }
}

impl<'a> Read for SequenceDecoder<'a> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let bytes = buf.len().min(self.steps.len() / 8);
        let mut bits = BitWriter::endian(&mut buf[..bytes], BigEndian);

        for _ in 0..bytes * 8 {
            let Some(step) = self.steps.next() else {
                break;
            };
            let offset = (step.y as usize * self.width + step.x as usize) * CHANNELS_PER_PIXEL
                + step.channel.index();
            bits.write_bit((self.pixels[offset] >> step.bit) & 1 == 1)?;
        }

        Ok(bytes)
    }
}
