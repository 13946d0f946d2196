//! AICA ADPCM: the 4-bit adaptive differential codec of the Dreamcast sound chip
//!
//! The AICA decodes the same ADPCM variant as the Yamaha YMZ280B. Every
//! sample is stored as a 4-bit code: bit 3 is the sign and bits 0-2 the
//! magnitude of the difference from the previous reconstructed sample,
//! measured in units of an adaptive quantizer step.
//!
//! **This is a pure codec** - one call handles one channel. Channel layout,
//! headers and sample rate are handled by the caller (dca-common's
//! `DcaHeader`).
//!
//! # Packing
//!
//! ```text
//! byte n:  bits 0-3 = sample 2n
//!          bits 4-7 = sample 2n + 1
//! ```
//!
//! A channel with an odd sample count leaves the high nibble of its last
//! byte zero.
//!
//! # Usage
//!
//! ```
//! use aica_adpcm::{decode, encode};
//!
//! let samples: Vec<i16> = vec![0; 1000];
//! let adpcm = encode(&samples);
//! assert_eq!(adpcm.len(), 500);
//!
//! // The caller stores the sample count alongside the data
//! let decoded = decode(&adpcm, samples.len());
//! assert_eq!(decoded.len(), samples.len());
//! ```

mod decode;
mod encode;
mod state;

pub use decode::decode;
pub use encode::encode;
pub use state::AdpcmState;

// =============================================================================
// Constants
// =============================================================================

/// Signal delta per code, in eighths of the current step
pub const DIFF_LOOKUP: [i32; 16] = [
    1, 3, 5, 7, 9, 11, 13, 15, // positive
    -1, -3, -5, -7, -9, -11, -13, -15, // negative
];

/// Step multiplier per code, in 1/256 units
///
/// The upper half mirrors the lower half so a full 4-bit code can index it
/// directly.
pub const SCALE_LOOKUP: [i32; 16] = [
    0x0e6, 0x0e6, 0x0e6, 0x0e6, 0x133, 0x199, 0x200, 0x266, //
    0x0e6, 0x0e6, 0x0e6, 0x0e6, 0x133, 0x199, 0x200, 0x266,
];

/// Quantizer step at the start of every channel
pub const STEP_MIN: i32 = 0x7f;

/// Largest quantizer step
pub const STEP_MAX: i32 = 0x6000;

/// Sign bit of a 4-bit code
pub const CODE_SIGN: u8 = 0b1000;

/// Number of bytes needed to hold `sample_count` codes
#[inline]
pub const fn encoded_len(sample_count: usize) -> usize {
    sample_count.div_ceil(2)
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Clamp value to 16-bit signed range
#[inline]
pub(crate) fn clamp_i16(v: i32) -> i32 {
    v.clamp(i16::MIN as i32, i16::MAX as i32)
}

// =============================================================================
// Tests
// =============================================================================
