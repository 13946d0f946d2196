//! In-memory sound representation
//!
//! [`AudioBuffer`] is what was loaded (or what a conversion step produced);
//! [`EncodingTarget`] is what is wanted in the output file. Samples are
//! always held as de-interleaved 16-bit PCM, whatever the source or target
//! format.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::limits::{DEFAULT_MAX_SAMPLES, MAX_CHANNELS};
use crate::{DcaError, Result};

/// Sample encoding of a `.dca` channel
///
/// Discriminants match the AICA's format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum DcaFormat {
    /// 16-bit signed little-endian PCM
    Pcm16 = 0,
    /// 8-bit signed PCM
    Pcm8 = 1,
    /// 4-bit AICA ADPCM
    Adpcm = 2,
}

impl DcaFormat {
    /// Format for a 2-bit header selector (3 is not a valid format)
    pub fn from_selector(selector: u8) -> Option<Self> {
        match selector {
            0 => Some(Self::Pcm16),
            1 => Some(Self::Pcm8),
            2 => Some(Self::Adpcm),
            _ => None,
        }
    }

    /// 2-bit header selector
    pub const fn selector(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Pcm16 => "pcm16",
            Self::Pcm8 => "pcm8",
            Self::Adpcm => "adpcm",
        }
    }
}

impl fmt::Display for DcaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DcaFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pcm16" => Ok(Self::Pcm16),
            "pcm8" => Ok(Self::Pcm8),
            "adpcm" => Ok(Self::Adpcm),
            _ => Err(format!("invalid format '{}' (expected pcm16, pcm8 or adpcm)", s)),
        }
    }
}

/// De-interleaved 16-bit PCM
///
/// Invariants: 1..=8 channels, every channel the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    sample_rate_hz: u32,
    channels: Vec<Vec<i16>>,
}

impl AudioBuffer {
    /// Build from per-channel sample arrays
    pub fn new(sample_rate_hz: u32, channels: Vec<Vec<i16>>) -> Result<Self> {
        if channels.is_empty() {
            return Err(DcaError::Unknown("sound has no channels".into()));
        }
        if channels.len() > MAX_CHANNELS {
            return Err(DcaError::TooManyChannels {
                channels: channels.len(),
                max: MAX_CHANNELS,
            });
        }
        let len = channels[0].len();
        if let Some(ragged) = channels.iter().position(|c| c.len() != len) {
            return Err(DcaError::Unknown(format!(
                "channel {} has {} samples, expected {}",
                ragged,
                channels[ragged].len(),
                len
            )));
        }

        Ok(Self {
            sample_rate_hz,
            channels,
        })
    }

    /// Build a single-channel buffer
    pub fn mono(sample_rate_hz: u32, samples: Vec<i16>) -> Self {
        Self {
            sample_rate_hz,
            channels: vec![samples],
        }
    }

    /// De-interleave frame-interleaved samples (`[l0, r0, l1, r1, ...]`)
    ///
    /// A trailing partial frame is dropped.
    pub fn from_interleaved(sample_rate_hz: u32, channel_count: usize, samples: &[i16]) -> Result<Self> {
        if channel_count == 0 {
            return Err(DcaError::Unknown("sound has no channels".into()));
        }
        if channel_count > MAX_CHANNELS {
            return Err(DcaError::TooManyChannels {
                channels: channel_count,
                max: MAX_CHANNELS,
            });
        }

        let frames = samples.len() / channel_count;
        let channels = (0..channel_count)
            .map(|c| {
                samples
                    .iter()
                    .skip(c)
                    .step_by(channel_count)
                    .take(frames)
                    .copied()
                    .collect()
            })
            .collect();

        Self::new(sample_rate_hz, channels)
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel
    pub fn sample_count(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count() == 0
    }

    pub fn channel(&self, index: usize) -> &[i16] {
        &self.channels[index]
    }

    pub fn channels(&self) -> &[Vec<i16>] {
        &self.channels
    }

    pub fn into_channels(self) -> Vec<Vec<i16>> {
        self.channels
    }

    /// Frame-interleaved copy of the samples
    pub fn interleaved(&self) -> Vec<i16> {
        let mut out = Vec::with_capacity(self.sample_count() * self.channel_count());
        for i in 0..self.sample_count() {
            out.extend(self.channels.iter().map(|c| c[i]));
        }
        out
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate_hz == 0 {
            return 0.0;
        }
        self.sample_count() as f64 / self.sample_rate_hz as f64
    }
}

/// What the output file should look like
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingTarget {
    pub format: DcaFormat,
    /// Channel count the buffer must have, 0 accepts any
    pub channels: usize,
    /// Rate the buffer must have, 0 accepts any
    pub sample_rate_hz: u32,
    /// Bypass `max_samples`
    pub allow_long: bool,
    /// Length cap for sounds that are not long
    pub max_samples: usize,
    pub loop_start: Option<u32>,
    pub loop_end: Option<u32>,
}

impl Default for EncodingTarget {
    fn default() -> Self {
        Self {
            format: DcaFormat::Adpcm,
            channels: 0,
            sample_rate_hz: 0,
            allow_long: false,
            max_samples: DEFAULT_MAX_SAMPLES,
            loop_start: None,
            loop_end: None,
        }
    }
}

impl EncodingTarget {
    pub fn new(format: DcaFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Set both loop points
    pub fn with_loop(mut self, start: u32, end: u32) -> Self {
        self.loop_start = Some(start);
        self.loop_end = Some(end);
        self
    }

    pub fn is_looping(&self) -> bool {
        self.loop_start.is_some() || self.loop_end.is_some()
    }

    /// Drop both loop points
    pub fn disable_loop(&mut self) {
        self.loop_start = None;
        self.loop_end = None;
    }

    /// Loop range as stored in the header
    ///
    /// Unset points default to the start and the end of the sound, so a
    /// sound that does not loop yields `(0, total_length)`.
    pub fn loop_range(&self, total_length: u32) -> (u32, u32) {
        (
            self.loop_start.unwrap_or(0),
            self.loop_end.unwrap_or(total_length),
        )
    }
}
