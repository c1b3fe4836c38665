use std::io::{Cursor, Result, Write};
use std::slice::Iter;

use bitstream_io::{BigEndian, BitRead, BitReader};

use crate::media::image::CHANNELS_PER_PIXEL;
use crate::sequence::{PixelLocation, PixelSequence};

/// Writes bytes MSB first into the pixel buffer, one bit per sequence step.
///
/// A write only accepts whole bytes, once fewer than 8 steps are left it
/// returns `Ok(0)` and `write_all` reports `WriteZero`.
pub struct SequenceEncoder<'a> {
    pixels: &'a mut [u8],
    width: usize,
    steps: Iter<'a, PixelLocation>,
}

impl<'a> SequenceEncoder<'a> {
    pub fn new(pixels: &'a mut [u8], sequence: &'a PixelSequence) -> Self {
        Self {
            pixels,
            width: sequence.width() as usize,
            steps: sequence.iter(),
        }
    }

    /// bits that can still be written
    pub fn remaining_bits(&self) -> usize {
        self.steps.len()
    }
}

impl<'a> Write for SequenceEncoder<'a> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let bytes = buf.len().min(self.steps.len() / 8);
        let mut bits = BitReader::endian(Cursor::new(&buf[..bytes]), BigEndian);

        for _ in 0..bytes * 8 {
            let bit = bits.read_bit()?;
            let Some(step) = self.steps.next() else {
                break;
            };
            let offset = (step.y as usize * self.width + step.x as usize) * CHANNELS_PER_PIXEL
                + step.channel.index();
            let mask = 1u8 << step.bit;
            if bit {
                self.pixels[offset] |= mask;
            } else {
                self.pixels[offset] &= !mask;
            }
        }

        Ok(bytes)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
