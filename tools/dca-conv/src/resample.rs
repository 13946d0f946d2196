//! Sample rate conversion
//!
//! Resamplers work on one channel of `f32` samples in `[-1.0, 1.0]`. The
//! conversion pipeline runs one resampler call per channel, in parallel.

use std::fmt;
use std::str::FromStr;

use dca_common::{DcaError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use serde::Deserialize;

/// Converts one channel to a new sample rate
pub trait Resample: Send + Sync {
    /// Resample `input` by `ratio` (output rate / input rate)
    ///
    /// The result holds exactly `output_len` samples.
    fn resample(&self, input: &[f32], ratio: f64, output_len: usize) -> Result<Vec<f32>>;
}

/// Which resampler to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResamplerKind {
    /// Band-limited sinc interpolation
    #[default]
    Sinc,
    /// Linear interpolation, fast but aliases when downsampling
    Linear,
}

impl ResamplerKind {
    pub fn build(self) -> Box<dyn Resample> {
        match self {
            Self::Sinc => Box::new(SincResampler::default()),
            Self::Linear => Box::new(LinearResampler),
        }
    }
}

impl fmt::Display for ResamplerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sinc => "sinc",
            Self::Linear => "linear",
        })
    }
}

impl FromStr for ResamplerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sinc" => Ok(Self::Sinc),
            "linear" => Ok(Self::Linear),
            _ => Err(format!("invalid resampler '{}' (expected sinc or linear)", s)),
        }
    }
}

/// High quality sinc resampler backed by rubato
#[derive(Debug, Clone, Copy)]
pub struct SincResampler {
    /// Input frames per processing call
    pub chunk_size: usize,
    /// Taps of the interpolation filter
    pub sinc_len: usize,
}

impl Default for SincResampler {
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            sinc_len: 256,
        }
    }
}

impl SincResampler {
    fn parameters(&self) -> SincInterpolationParameters {
        SincInterpolationParameters {
            sinc_len: self.sinc_len,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Cubic,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        }
    }
}

impl Resample for SincResampler {
    fn resample(&self, input: &[f32], ratio: f64, output_len: usize) -> Result<Vec<f32>> {
        if input.is_empty() || output_len == 0 {
            return Ok(vec![0.0; output_len]);
        }

        let mut resampler =
            SincFixedIn::<f32>::new(ratio, 1.1, self.parameters(), self.chunk_size, 1)
                .map_err(|e| DcaError::Resample(e.to_string()))?;

        // The filter delays its output; run until the delayed tail is out too
        let delay = resampler.output_delay();
        let wanted = delay + output_len;
        let mut output: Vec<f32> = Vec::with_capacity(wanted + self.chunk_size);

        let mut pos = 0;
        while pos < input.len() {
            let needed = resampler.input_frames_next();
            let end = (pos + needed).min(input.len());
            let chunk = &input[pos..end];
            let wave_in = std::slice::from_ref(&chunk);
            let frames = if chunk.len() == needed {
                resampler.process(wave_in, None)
            } else {
                resampler.process_partial(Some(wave_in), None)
            }
            .map_err(|e| DcaError::Resample(e.to_string()))?;
            output.extend_from_slice(&frames[0]);
            pos = end;
        }

        while output.len() < wanted {
            let frames = resampler
                .process_partial(None::<&[&[f32]]>, None)
                .map_err(|e| DcaError::Resample(e.to_string()))?;
            if frames[0].is_empty() {
                break;
            }
            output.extend_from_slice(&frames[0]);
        }

        let mut output = output.split_off(delay.min(output.len()));
        output.resize(output_len, 0.0);
        Ok(output)
    }
}

/// Linear interpolation between neighbouring samples
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearResampler;

impl Resample for LinearResampler {
    fn resample(&self, input: &[f32], ratio: f64, output_len: usize) -> Result<Vec<f32>> {
        if input.is_empty() {
            return Ok(vec![0.0; output_len]);
        }
        if ratio <= 0.0 {
            return Err(DcaError::Resample(format!("invalid ratio {}", ratio)));
        }

        let step = 1.0 / ratio;
        let last = input.len() - 1;
        let output = (0..output_len)
            .map(|i| {
                let src_pos = i as f64 * step;
                let src_idx = src_pos as usize;
                if src_idx >= last {
                    return input[last];
                }
                let frac = (src_pos - src_idx as f64) as f32;
                let a = input[src_idx];
                let b = input[src_idx + 1];
                a + (b - a) * frac
            })
            .collect();

        Ok(output)
    }
}

/// 16-bit samples to `[-1.0, 1.0)`
pub fn samples_to_f32(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&s| s as f32 / 32768.0).collect()
}

/// `f32` samples back to 16-bit, clamping overshoot
pub fn f32_to_samples(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s * 32768.0).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16)
        .collect()
}
