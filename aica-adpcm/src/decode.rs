//! ADPCM decoder implementation
//!
//! Note: This is a pure codec - no header is parsed. The caller (dca-common)
//! provides the sample count from `DcaHeader`.

use crate::AdpcmState;

/// Decode one channel of AICA ADPCM to 16-bit PCM
///
/// # Arguments
/// * `data` - Packed 4-bit codes, low nibble first
/// * `sample_count` - Number of samples to produce (from the container header)
///
/// # Returns
/// Exactly `sample_count` samples. Decoding stops mid-byte when the count is
/// odd, so padding nibbles never leak into the output. If `data` is shorter
/// than the count requires, the missing codes decode as code 0.
pub fn decode(data: &[u8], sample_count: usize) -> Vec<i16> {
    let mut output = Vec::with_capacity(sample_count);
    let mut state = AdpcmState::new();

    let mut bytes = data.iter().copied();
    while output.len() < sample_count {
        let byte = bytes.next().unwrap_or(0);

        output.push(state.decode_sample(byte & 0x0f));
        if output.len() == sample_count {
            break;
        }
        output.push(state.decode_sample(byte >> 4));
    }

    output
}
