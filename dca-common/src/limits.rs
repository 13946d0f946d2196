//! AICA hardware limits

/// Channels supported by the converter and the container
pub const MAX_CHANNELS: usize = 8;

/// Longest sample the AICA addresses natively (16-bit sample position)
pub const AICA_MAX_SAMPLES: usize = 1 << 16;

/// Samples kept free below [`AICA_MAX_SAMPLES`]
///
/// Looping is unreliable at the very end of the addressable range, so
/// converted sounds stay this far below it unless long sounds are allowed.
pub const DEFAULT_LENGTH_MARGIN: usize = 64;

/// Default length cap for sounds that are not allowed to be long
pub const DEFAULT_MAX_SAMPLES: usize = AICA_MAX_SAMPLES - DEFAULT_LENGTH_MARGIN;

/// Lowest playback rate the pitch register can express (rounded down)
pub const MIN_SAMPLE_RATE_HZ: u32 = 172;

/// Highest playback rate at which the AICA decodes ADPCM
pub const MAX_ADPCM_SAMPLE_RATE_HZ: u32 = 88200;

/// Length cap for a given safety margin
pub const fn max_samples_with_margin(margin: usize) -> usize {
    AICA_MAX_SAMPLES.saturating_sub(margin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_max_samples() {
        assert_eq!(DEFAULT_MAX_SAMPLES, 65472);
        assert_eq!(max_samples_with_margin(DEFAULT_LENGTH_MARGIN), DEFAULT_MAX_SAMPLES);
        assert_eq!(max_samples_with_margin(0), AICA_MAX_SAMPLES);
        assert_eq!(max_samples_with_margin(usize::MAX), 0);
    }
}
