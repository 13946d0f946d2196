//! Per-channel ADPCM predictor state

use crate::{CODE_SIGN, DIFF_LOOKUP, SCALE_LOOKUP, STEP_MAX, STEP_MIN, clamp_i16};

/// ADPCM channel state
///
/// The decoder reconstructs `signal` by accumulating scaled deltas, and
/// `step` adapts after every code: small codes shrink it, large codes grow
/// it. The encoder runs the same state so it always quantizes against what
/// the hardware will reconstruct.
///
/// A fresh state must be used for every channel; the AICA resets its
/// predictor when a channel is keyed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdpcmState {
    /// Last reconstructed sample, always within i16 range
    pub signal: i32,

    /// Quantizer step, always within `STEP_MIN..=STEP_MAX`
    pub step: i32,
}

impl Default for AdpcmState {
    fn default() -> Self {
        Self::new()
    }
}

impl AdpcmState {
    /// Create the power-on state (silence, smallest step)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            signal: 0,
            step: STEP_MIN,
        }
    }

    /// Reset to the power-on state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Quantize one sample to a 4-bit code and advance the state
    ///
    /// The low 3 bits of the input are masked off first; this noticeably
    /// improves the match between encoder and decoder rounding.
    #[inline]
    pub fn encode_sample(&mut self, sample: i16) -> u8 {
        let diff = (sample as i32 & !7) - self.signal;
        let scaled = diff * 8 / self.step;

        let mut code = (scaled.abs() / 2).min(7) as u8;
        if scaled < 0 {
            code |= CODE_SIGN;
        }

        self.advance(code);
        code
    }

    /// Reconstruct one sample from a 4-bit code and advance the state
    #[inline]
    pub fn decode_sample(&mut self, code: u8) -> i16 {
        self.advance(code & 0x0f);
        self.signal as i16
    }

    #[inline]
    fn advance(&mut self, code: u8) {
        let code = code as usize;

        self.signal = clamp_i16(self.signal + self.step * DIFF_LOOKUP[code] / 8);
        self.step = ((self.step * SCALE_LOOKUP[code & 7]) >> 8).clamp(STEP_MIN, STEP_MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_default() {
        let state = AdpcmState::new();
        assert_eq!(state.signal, 0);
        assert_eq!(state.step, STEP_MIN);
    }

    #[test]
    fn test_first_code_of_silence() {
        let mut state = AdpcmState::new();
        let code = state.encode_sample(0);

        // Smallest positive code: signal moves by step/8, step stays at minimum
        assert_eq!(code, 0);
        assert_eq!(state.signal, STEP_MIN / 8);
        assert_eq!(state.step, STEP_MIN);
    }

    #[test]
    fn test_large_jump_saturates_code() {
        let mut state = AdpcmState::new();
        let code = state.encode_sample(i16::MAX);
        assert_eq!(code, 7);

        let mut state = AdpcmState::new();
        let code = state.encode_sample(i16::MIN);
        assert_eq!(code, 7 | CODE_SIGN);
    }

    #[test]
    fn test_step_grows_on_large_codes() {
        let mut state = AdpcmState::new();
        state.decode_sample(7);
        assert_eq!(state.step, (STEP_MIN * 0x266) >> 8);
    }

    #[test]
    fn test_step_clamped_to_max() {
        let mut state = AdpcmState::new();
        for _ in 0..64 {
            state.decode_sample(7);
        }
        assert_eq!(state.step, STEP_MAX);
        assert_eq!(state.signal, i16::MAX as i32);
    }

    #[test]
    fn test_signal_clamped_to_min() {
        let mut state = AdpcmState::new();
        for _ in 0..64 {
            state.decode_sample(15);
        }
        assert_eq!(state.signal, i16::MIN as i32);
    }

    #[test]
    fn test_encoder_and_decoder_track() {
        let mut encoder = AdpcmState::new();
        let mut decoder = AdpcmState::new();

        for i in 0..500i32 {
            let sample = ((i * 331) % 20000 - 10000) as i16;
            let code = encoder.encode_sample(sample);
            decoder.decode_sample(code);
            assert_eq!(encoder, decoder);
        }
    }

    #[test]
    fn test_reset() {
        let mut state = AdpcmState::new();
        state.decode_sample(7);
        state.reset();
        assert_eq!(state, AdpcmState::new());
    }
}
