//! Keyed walk over the pixels of a carrier.
//!
//! A [`PixelSequence`] visits every pixel exactly once, in an order derived from
//! the sequence seed, and names the channel and bit that carry one payload bit
//! at each pixel. The same seed, dimensions and [`SequenceOptions`] always give
//! the same sequence.

mod keyed_stream;

pub use keyed_stream::KeyedStream;

use log::debug;

use crate::cancel::CancellationToken;
use crate::error::PixelveilError;
use crate::result::Result;

/// Color channel of an RGBA pixel that may carry payload bits, alpha never does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// offset of the channel inside an RGBA pixel
    pub fn index(&self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }

    fn rotating(pixel_index: u32) -> Self {
        match pixel_index % 3 {
            0 => Channel::Red,
            1 => Channel::Green,
            _ => Channel::Blue,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelSelection {
    /// the same channel for every pixel
    Fixed(Channel),
    /// red, green, blue by pixel index modulo 3
    Rotating,
    /// drawn from the keyed stream per visited pixel
    #[default]
    Keyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SequenceOptions {
    pub channels: ChannelSelection,

    /// draw a bit position `0..=7` per pixel instead of always using the least significant bit
    pub multi_bit: bool,

    /// spread keyed adjustments of the bit position to the neighbours of each visited pixel,
    /// has no effect without `multi_bit`
    pub error_diffusion: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelLocation {
    pub x: u32,
    pub y: u32,
    pub channel: Channel,
    /// 0 is the least significant bit
    pub bit: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelSequence {
    width: u32,
    height: u32,
    locations: Vec<PixelLocation>,
}

impl PixelSequence {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// one payload bit per step
    pub fn capacity_bits(&self) -> usize {
        self.locations.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PixelLocation> {
        self.locations.iter()
    }

    pub fn as_slice(&self) -> &[PixelLocation] {
        &self.locations
    }

    /// the first `len` steps only, used to probe capacity limits
    pub fn truncated(&self, len: usize) -> Self {
        Self {
            width: self.width,
            height: self.height,
            locations: self.locations[..len.min(self.locations.len())].to_vec(),
        }
    }
}

impl<'a> IntoIterator for &'a PixelSequence {
    type Item = &'a PixelLocation;
    type IntoIter = std::slice::Iter<'a, PixelLocation>;

    fn into_iter(self) -> Self::IntoIter {
        self.locations.iter()
    }
}

pub fn generate(
    seed: &[u8],
    width: u32,
    height: u32,
    options: &SequenceOptions,
) -> Result<PixelSequence> {
    generate_cancellable(seed, width, height, options, &CancellationToken::default())
}

pub fn generate_cancellable(
    seed: &[u8],
    width: u32,
    height: u32,
    options: &SequenceOptions,
    cancel: &CancellationToken,
) -> Result<PixelSequence> {
    let total = width
        .checked_mul(height)
        .ok_or(PixelveilError::InvalidDimensions { width, height })?;
    debug!("Generating sequence for {width}x{height} with {options:?}");

    let mut stream = KeyedStream::from_seed(seed);
    let line = width.max(1) as usize;

    let mut indices: Vec<u32> = (0..total).collect();
    for (step, i) in (1..total).rev().enumerate() {
        if step % line == 0 {
            cancel.check()?;
        }
        let j = stream.index(i);
        indices.swap(i as usize, j as usize);
    }

    let diffuse = options.multi_bit && options.error_diffusion;
    let mut errors = if diffuse {
        vec![0f32; total as usize]
    } else {
        Vec::new()
    };

    let mut locations = Vec::with_capacity(total as usize);
    for (step, &index) in indices.iter().enumerate() {
        if step % line == 0 {
            cancel.check()?;
        }
        let x = index % width;
        let y = index / width;

        let channel = match options.channels {
            ChannelSelection::Fixed(channel) => channel,
            ChannelSelection::Rotating => Channel::rotating(index),
            ChannelSelection::Keyed => stream.channel(),
        };

        let mut bit = 0;
        if options.multi_bit {
            bit = stream.bit();
            if diffuse {
                let error = std::mem::take(&mut errors[index as usize]);
                bit = (bit as f32 + error).round().clamp(0.0, 7.0) as u8;

                for neighbour in neighbours(x, y, width, height).into_iter().flatten() {
                    errors[neighbour as usize] += stream.adjustment();
                }
            }
        }

        locations.push(PixelLocation {
            x,
            y,
            channel,
            bit,
        });
    }

    Ok(PixelSequence {
        width,
        height,
        locations,
    })
}

/// left, right, up, down, without wrapping around the image edges
fn neighbours(x: u32, y: u32, width: u32, height: u32) -> [Option<u32>; 4] {
    let index = y * width + x;
    [
        (x > 0).then(|| index - 1),
        (x + 1 < width).then(|| index + 1),
        (y > 0).then(|| index - width),
        (y + 1 < height).then(|| index + width),
    ]
}
