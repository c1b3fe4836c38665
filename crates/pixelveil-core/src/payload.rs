//! Framing of an encrypted payload before it goes into the pixels.
//!
//! A frame is `base64(iv ‖ ciphertext) ‖ 0x03`. The base64 alphabet never
//! contains the delimiter, so the first `0x03` read back always ends the frame,
//! and any other byte outside the alphabet means there is no frame at all.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use pixelveil_crypto::cipher::IV_LEN;
use pixelveil_crypto::CipherEnvelope;

use crate::error::PixelveilError;
use crate::result::Result;

/// End of text, terminates every frame
pub const DELIMITER: u8 = 0x03;

pub fn encode(envelope: &CipherEnvelope) -> Vec<u8> {
    let mut frame = BASE64.encode(envelope.to_bytes()).into_bytes();
    frame.push(DELIMITER);
    frame
}

/// `frame` are the bytes in front of the delimiter
pub fn decode(frame: &[u8]) -> Result<CipherEnvelope> {
    let raw = BASE64
        .decode(frame)
        .map_err(|_| PixelveilError::NoHiddenPayload)?;

    CipherEnvelope::from_bytes(&raw).map_err(|_| PixelveilError::NoHiddenPayload)
}

/// Length of the frame, delimiter included, for a plaintext of `plaintext_len` bytes
pub fn framed_len(plaintext_len: usize) -> usize {
    let raw = IV_LEN + CipherEnvelope::ciphertext_len(plaintext_len);
    (raw + 2) / 3 * 4 + 1
}

/// bytes that can show up inside a frame
pub fn is_frame_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'+' | b'/' | b'=')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelveil_crypto::cipher::encrypt;

    #[test]
    fn frame_layout() {
        let envelope = encrypt(b"hi", &[5u8; 32]);
        let frame = encode(&envelope);

        assert_eq!(frame.len(), 45);
        assert_eq!(frame.len(), framed_len(2));
        assert_eq!(frame.last(), Some(&DELIMITER));
        assert_eq!(frame.iter().filter(|b| **b == DELIMITER).count(), 1);
        assert!(frame[..44].iter().all(|b| is_frame_byte(*b)));

        let raw = BASE64.decode(&frame[..44]).unwrap();
        assert_eq!(&raw[..IV_LEN], &envelope.iv);
        assert_eq!(&raw[IV_LEN..], envelope.ciphertext.as_slice());
    }

    #[test]
    fn decodes_what_it_encodes() {
        let envelope = encrypt(b"The quick brown fox jumps over the lazy dog", &[5u8; 32]);
        let frame = encode(&envelope);

        assert_eq!(decode(&frame[..frame.len() - 1]).unwrap(), envelope);
    }

    #[test]
    fn framed_len_matches_real_frames() {
        for len in [0, 1, 15, 16, 17, 100, 1000] {
            let envelope = encrypt(&vec![b'x'; len], &[1u8; 32]);
            assert_eq!(encode(&envelope).len(), framed_len(len), "plaintext of {len}");
        }
    }

    #[test]
    fn noise_is_no_payload() {
        assert!(matches!(
            decode(b"not base64 at all!"),
            Err(PixelveilError::NoHiddenPayload)
        ));
        // valid base64, but far too short for an envelope
        assert!(matches!(
            decode(b"aGk="),
            Err(PixelveilError::NoHiddenPayload)
        ));
        assert!(matches!(decode(b""), Err(PixelveilError::NoHiddenPayload)));
    }

    #[test]
    fn frame_bytes() {
        assert!(is_frame_byte(b'A'));
        assert!(is_frame_byte(b'z'));
        assert!(is_frame_byte(b'0'));
        assert!(is_frame_byte(b'='));
        assert!(!is_frame_byte(DELIMITER));
        assert!(!is_frame_byte(b' '));
        assert!(!is_frame_byte(0xff));
    }
}
