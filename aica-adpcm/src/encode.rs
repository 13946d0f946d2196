//! ADPCM encoder implementation
//!
//! Note: This is a pure codec - it encodes a single channel and writes no
//! header. The caller (dca-common) stores the sample count and pads the
//! channel to the container's alignment.

use crate::{AdpcmState, encoded_len};

/// Encode one channel of 16-bit PCM to 4-bit AICA ADPCM
///
/// # Arguments
/// * `samples` - Input PCM samples (one channel, 16-bit)
///
/// # Returns
/// `ceil(samples.len() / 2)` bytes; the first sample of each pair is in the
/// low nibble.
pub fn encode(samples: &[i16]) -> Vec<u8> {
    let mut output = Vec::with_capacity(encoded_len(samples.len()));
    let mut state = AdpcmState::new();

    for pair in samples.chunks(2) {
        let mut byte = state.encode_sample(pair[0]);
        if let Some(&second) = pair.get(1) {
            byte |= state.encode_sample(second) << 4;
        }
        output.push(byte);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_empty() {
        let encoded = encode(&[]);
        assert!(encoded.is_empty());
    }

    #[test]
    fn test_encode_odd_length_leaves_high_nibble_clear() {
        let encoded = encode(&[i16::MAX; 3]);
        assert_eq!(encoded.len(), 2);
        assert_eq!(encoded[1] & 0xf0, 0);
    }

    #[test]
    fn test_encode_nibble_order() {
        // Full-scale positive then full-scale negative: 7 in the low nibble,
        // a negative code in the high nibble
        let encoded = encode(&[i16::MAX, i16::MIN]);
        assert_eq!(encoded[0] & 0x0f, 7);
        assert_eq!((encoded[0] >> 4) & 0b1000, 0b1000);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let samples: Vec<i16> = (0..256).map(|i| (i * 127) as i16).collect();
        assert_eq!(encode(&samples), encode(&samples));
    }
}
