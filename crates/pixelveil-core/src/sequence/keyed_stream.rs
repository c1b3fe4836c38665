//! Keyed pseudo random stream behind every sequence decision.
//!
//! ChaCha20 seeded with `SHA-256(seed)`. Every draw goes through a `u32` or
//! `f32` range, `usize` ranges would consume a different amount of the stream
//! on 32 bit targets and break extraction across platforms.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

use super::Channel;

/// Largest magnitude a single neighbour adjustment can have
pub const MAX_ADJUSTMENT: f32 = 0.25;

pub struct KeyedStream {
    rng: ChaCha20Rng,
}

impl KeyedStream {
    pub fn from_seed(seed: &[u8]) -> Self {
        let digest: [u8; 32] = Sha256::digest(seed).into();

        Self {
            rng: ChaCha20Rng::from_seed(digest),
        }
    }

    /// uniform in `0..=max`
    #[inline]
    pub fn index(&mut self, max: u32) -> u32 {
        self.rng.gen_range(0..=max)
    }

    #[inline]
    pub fn channel(&mut self) -> Channel {
        match self.rng.gen_range(0..3u32) {
            0 => Channel::Red,
            1 => Channel::Green,
            _ => Channel::Blue,
        }
    }

    #[inline]
    pub fn bit(&mut self) -> u8 {
        self.rng.gen_range(0..=7u32) as u8
    }

    /// uniform in `[-0.25, 0.25)`
    #[inline]
    pub fn adjustment(&mut self) -> f32 {
        self.rng.gen_range(-MAX_ADJUSTMENT..MAX_ADJUSTMENT)
    }
}
