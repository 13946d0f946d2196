//! AICA pitch encoding
//!
//! The AICA sets a channel's playback rate through a 15-bit pseudo floating
//! point register:
//!
//! ```text
//! bit  15     : unused, always 0
//! bits 11-14  : exponent, 4-bit two's complement (-8..=7)
//! bits 0-9    : mantissa (implicit leading 1)
//! ```
//!
//! `rate = 44100 * 2^exponent * (1 + mantissa / 1024)`
//!
//! Rates therefore range from ~172.27 Hz to ~11.29 MHz, with a resolution
//! that halves with every exponent step down.

/// Rate at exponent 0, mantissa 0
pub const PITCH_BASE_HZ: u32 = 44100;

const EXPONENT_MIN: i8 = -8;
const EXPONENT_MAX: i8 = 7;
const EXPONENT_SHIFT: u16 = 11;
const EXPONENT_MASK: u16 = 0xf;
const MANTISSA_BITS: u32 = 10;
const MANTISSA_MASK: u16 = 0x3ff;

/// An AICA pitch register value
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AicaPitch(u16);

impl AicaPitch {
    /// Lowest representable rate (~172.27 Hz)
    pub const MIN: Self = Self::from_parts(EXPONENT_MIN, 0);

    /// Highest representable rate (~11.29 MHz)
    pub const MAX: Self = Self::from_parts(EXPONENT_MAX, MANTISSA_MASK);

    /// Build from an exponent in -8..=7 and a 10-bit mantissa
    ///
    /// Out-of-range bits are masked off.
    pub const fn from_parts(exponent: i8, mantissa: u16) -> Self {
        Self(((exponent as u16 & EXPONENT_MASK) << EXPONENT_SHIFT) | (mantissa & MANTISSA_MASK))
    }

    /// Wrap a raw register value; bit 15 is ignored
    pub const fn from_code(code: u16) -> Self {
        Self(code & 0x7fff)
    }

    /// Closest pitch to `freq_hz`
    ///
    /// Rates below [`AicaPitch::MIN`] saturate to it, rates above
    /// [`AicaPitch::MAX`] saturate to that.
    pub fn from_hz(freq_hz: u32) -> Self {
        let freq = freq_hz as u64;

        let mut exponent = EXPONENT_MAX;
        while exponent > EXPONENT_MIN && (freq << 8) < exponent_base_x256(exponent) {
            exponent -= 1;
        }

        let (num, den) = scaled_ratio(freq, exponent);
        if num < den << MANTISSA_BITS {
            return Self::MIN;
        }

        // round(freq / base * 1024), always within 1024..=2048 below the top exponent
        let mut value = (num + den / 2) / den;
        if value >= 2 << MANTISSA_BITS {
            if exponent < EXPONENT_MAX {
                exponent += 1;
                value = 1 << MANTISSA_BITS;
            } else {
                return Self::MAX;
            }
        }

        Self::from_parts(exponent, value as u16)
    }

    /// Raw register value (bit 15 clear)
    pub const fn code(self) -> u16 {
        self.0
    }

    /// Signed exponent, -8..=7
    pub const fn exponent(self) -> i8 {
        (((self.0 >> EXPONENT_SHIFT) as u8) << 4) as i8 >> 4
    }

    /// 10-bit mantissa
    pub const fn mantissa(self) -> u16 {
        self.0 & MANTISSA_MASK
    }

    /// Playback rate in hertz
    pub fn to_hz(self) -> f64 {
        PITCH_BASE_HZ as f64
            * 2f64.powi(self.exponent() as i32)
            * (1.0 + self.mantissa() as f64 / (1 << MANTISSA_BITS) as f64)
    }

    /// The next representable pitch below this one
    pub const fn next_lower(self) -> Option<Self> {
        let exponent = self.exponent();
        let mantissa = self.mantissa();
        if mantissa > 0 {
            Some(Self::from_parts(exponent, mantissa - 1))
        } else if exponent > EXPONENT_MIN {
            Some(Self::from_parts(exponent - 1, MANTISSA_MASK))
        } else {
            None
        }
    }
}

/// `44100 * 2^exponent * 256`, exact for every exponent
fn exponent_base_x256(exponent: i8) -> u64 {
    (PITCH_BASE_HZ as u64) << (exponent + 8) as u32
}

/// `freq * 1024 / (44100 * 2^exponent)` as an exact numerator/denominator pair
fn scaled_ratio(freq: u64, exponent: i8) -> (u64, u64) {
    if exponent >= 0 {
        (
            freq << MANTISSA_BITS,
            (PITCH_BASE_HZ as u64) << exponent as u32,
        )
    } else {
        (
            freq << (MANTISSA_BITS + exponent.unsigned_abs() as u32),
            PITCH_BASE_HZ as u64,
        )
    }
}

/// Encode a rate in hertz to the AICA pitch register format
pub fn encode_rate(freq_hz: u32) -> u16 {
    AicaPitch::from_hz(freq_hz).code()
}

/// Decode an AICA pitch register value to hertz
pub fn decode_rate(code: u16) -> f64 {
    AicaPitch::from_code(code).to_hz()
}

/// Round `freq_hz` to the closest rate the AICA can actually play
///
/// Storing snapped rates keeps length and ratio math in agreement with
/// what the hardware does at playback.
pub fn nearest_encodable_rate(freq_hz: u32) -> u32 {
    decode_rate(encode_rate(freq_hz)).round() as u32
}
