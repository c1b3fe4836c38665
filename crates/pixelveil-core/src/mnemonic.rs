//! Keyed obfuscation of BIP39 mnemonics as word coordinates.
//!
//! Every word index is shifted by an offset taken from `SHA-256(secret)`, the
//! result is a list of numbers below 2048 that only turns back into the
//! mnemonic with the same secret. Reverting with another secret yields a word
//! list that fails the BIP39 checksum in 15 of 16 cases.

use std::fmt::{self, Debug, Formatter};

use bip39::{Language, Mnemonic};
use log::{debug, warn};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::PixelveilError;
use crate::result::Result;

pub const WORD_LIST_LEN: u16 = 2048;

/// coordinates of a mnemonic, one per word, each below 2048
pub type CoordinateVector = Vec<u16>;

/// The secret the offsets are derived from
#[derive(Clone, PartialEq, Eq)]
pub struct CoordinateSecret(String);

impl CoordinateSecret {
    /// private key and password are simply concatenated
    pub fn new(private_key: &str, password: &str) -> Self {
        Self(format!("{private_key}{password}"))
    }

    fn digest(&self) -> [u8; 32] {
        Sha256::digest(self.0.as_bytes()).into()
    }
}

impl From<&str> for CoordinateSecret {
    fn from(secret: &str) -> Self {
        Self(secret.to_string())
    }
}

impl Debug for CoordinateSecret {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("CoordinateSecret(***)")
    }
}

/// Which bytes of the secret's digest become the word offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetSchedule {
    /// `digest[i mod 32]`
    #[default]
    ByteWise,
    /// two hex characters of the lowercase hex digest starting at character `i`,
    /// the windows overlap. Needed to revert coordinates made by older releases.
    HexWindow,
}

impl OffsetSchedule {
    fn offsets(&self, secret: &CoordinateSecret, count: usize) -> Vec<u16> {
        let digest = secret.digest();
        match self {
            OffsetSchedule::ByteWise => (0..count)
                .map(|i| digest[i % digest.len()] as u16)
                .collect(),
            OffsetSchedule::HexWindow => {
                let hex: Vec<u8> = digest.iter().flat_map(|b| [b >> 4, b & 0x0f]).collect();
                (0..count)
                    .map(|i| {
                        let start = i % hex.len();
                        hex[start..(start + 2).min(hex.len())]
                            .iter()
                            .fold(0u16, |acc, nibble| acc * 16 + *nibble as u16)
                    })
                    .collect()
            }
        }
    }
}

pub fn parse_mnemonic(phrase: &str) -> Result<Mnemonic> {
    Ok(Mnemonic::parse_in_normalized(Language::English, phrase.trim())?)
}

/// 12 words from 128 bits of OS entropy
pub fn generate_mnemonic() -> Result<Mnemonic> {
    let mut entropy = [0u8; 16];
    OsRng.fill_bytes(&mut entropy);

    Ok(Mnemonic::from_entropy(&entropy)?)
}

pub fn to_coordinates(mnemonic: &Mnemonic, secret: &CoordinateSecret) -> Result<CoordinateVector> {
    to_coordinates_with(mnemonic, secret, OffsetSchedule::default())
}

pub fn to_coordinates_with(
    mnemonic: &Mnemonic,
    secret: &CoordinateSecret,
    schedule: OffsetSchedule,
) -> Result<CoordinateVector> {
    let phrase = mnemonic.to_string();
    let words: Vec<&str> = phrase.split_whitespace().collect();
    let offsets = schedule.offsets(secret, words.len());
    debug!("Mapping {} words with {schedule:?}", words.len());

    words
        .iter()
        .zip(offsets)
        .map(|(word, offset)| {
            let index = Language::English
                .find_word(word)
                .ok_or(PixelveilError::InvalidSecret)?;
            Ok((index + offset) % WORD_LIST_LEN)
        })
        .collect()
}

pub fn to_mnemonic(coordinates: &[u16], secret: &CoordinateSecret) -> Result<Mnemonic> {
    to_mnemonic_with(coordinates, secret, OffsetSchedule::default())
}

pub fn to_mnemonic_with(
    coordinates: &[u16],
    secret: &CoordinateSecret,
    schedule: OffsetSchedule,
) -> Result<Mnemonic> {
    if let Some(&coordinate) = coordinates.iter().find(|c| **c >= WORD_LIST_LEN) {
        return Err(PixelveilError::InvalidCoordinate(coordinate));
    }

    let word_list = Language::English.word_list();
    let offsets = schedule.offsets(secret, coordinates.len());
    let phrase = coordinates
        .iter()
        .zip(offsets)
        .map(|(coordinate, offset)| {
            word_list[((coordinate + WORD_LIST_LEN - offset) % WORD_LIST_LEN) as usize]
        })
        .collect::<Vec<_>>()
        .join(" ");

    Mnemonic::parse_in_normalized(Language::English, &phrase).map_err(|e| {
        warn!("Reverted coordinates are no valid mnemonic: {e}");
        PixelveilError::InvalidSecret
    })
}
