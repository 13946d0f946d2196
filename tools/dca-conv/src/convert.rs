//! Conversion policy
//!
//! Turns a loaded sound plus the user's wishes into a buffer and an
//! [`EncodingTarget`] that the writers can store as is:
//!
//! 1. Reduce channels (downmix to mono, or keep the source layout)
//! 2. Snap the rate to one the pitch register can express, clamp to range
//! 3. Lower that rate if the sound would not fit the AICA length limit
//! 4. Resample, scaling loop points along (truncating)
//! 5. Repair loop points that no longer fit
//! 6. Optionally trim leading and trailing silence

use dca_common::limits::max_samples_with_margin;
use dca_common::{
    AicaPitch, AudioBuffer, DcaError, DcaFormat, EncodingTarget, MAX_ADPCM_SAMPLE_RATE_HZ,
    MIN_SAMPLE_RATE_HZ, Result, nearest_encodable_rate,
};
use rayon::prelude::*;

use crate::resample::{Resample, f32_to_samples, samples_to_f32};

/// Trim threshold used when trimming is asked for without a level
pub const DEFAULT_TRIM_THRESHOLD: i16 = 256;

/// Container the converted sound goes into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// `.dca`: rate snapped to the pitch register, length capped
    Dca,
    /// `.wav`: source layout and rate unless asked otherwise
    Wav,
}

/// Hardware bounds the rate and length decisions respect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Longest sound (in samples per channel) written without `allow_long`
    pub max_samples: usize,
    pub min_rate_hz: u32,
    /// Highest rate the ADPCM decoder keeps up with
    pub max_adpcm_rate_hz: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_samples: dca_common::DEFAULT_MAX_SAMPLES,
            min_rate_hz: MIN_SAMPLE_RATE_HZ,
            max_adpcm_rate_hz: MAX_ADPCM_SAMPLE_RATE_HZ,
        }
    }
}

impl Limits {
    /// Limits with the length cap `margin` samples below the AICA maximum
    pub fn with_length_margin(margin: usize) -> Self {
        Self {
            max_samples: max_samples_with_margin(margin),
            ..Self::default()
        }
    }
}

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertRequest {
    pub output: OutputKind,
    /// `None` picks ADPCM for `.dca` and PCM16 for `.wav`
    pub format: Option<DcaFormat>,
    /// 0 picks mono for `.dca` and the source count for `.wav`
    pub channels: usize,
    /// 0 keeps the source rate
    pub sample_rate_hz: u32,
    /// Keep long sounds at their rate instead of shrinking them
    pub allow_long: bool,
    pub loop_start: Option<u32>,
    pub loop_end: Option<u32>,
    /// Trim silence quieter than this, when set
    pub trim_threshold: Option<i16>,
    pub limits: Limits,
}

impl ConvertRequest {
    pub fn new(output: OutputKind) -> Self {
        Self {
            output,
            format: None,
            channels: 0,
            sample_rate_hz: 0,
            allow_long: false,
            loop_start: None,
            loop_end: None,
            trim_threshold: None,
            limits: Limits::default(),
        }
    }

    /// Sample format after defaults
    pub fn resolved_format(&self) -> DcaFormat {
        self.format.unwrap_or(match self.output {
            OutputKind::Dca => DcaFormat::Adpcm,
            OutputKind::Wav => DcaFormat::Pcm16,
        })
    }
}

/// Result of [`convert`]
#[derive(Debug, Clone)]
pub struct Converted {
    pub buffer: AudioBuffer,
    pub target: EncodingTarget,
}

/// Loop points as they travel through the pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LoopPoints {
    start: Option<u32>,
    end: Option<u32>,
}

impl LoopPoints {
    fn is_looping(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    fn scale(&mut self, ratio: f64) {
        let scale = |p: u32| (p as f64 * ratio) as u32;
        self.start = self.start.map(scale);
        self.end = self.end.map(scale);
    }

    /// Move both points `offset` samples earlier
    fn shift(&mut self, offset: usize) {
        let offset = offset as u32;
        self.start = self.start.map(|p| p.saturating_sub(offset));
        self.end = self.end.map(|p| p.saturating_sub(offset));
    }

    /// Clamp the end into the sound, drop a loop that became empty
    fn repair(&mut self, length: usize) {
        let length = length as u32;
        if let Some(end) = self.end
            && end > length
        {
            tracing::warn!("Loop end {} is past the end of the sound, using {}", end, length);
            self.end = Some(length);
        }
        if self.is_looping() {
            let start = self.start.unwrap_or(0);
            let end = self.end.unwrap_or(length);
            if start >= end {
                tracing::warn!(
                    "Loop start {} is not before loop end {}, disabling loop",
                    start,
                    end
                );
                *self = Self::default();
            }
        }
    }
}

/// Run the conversion pipeline
///
/// # Errors
/// - `InvalidLoop` if the loop start lies past the end of the source; a start
///   exactly at the end only disables the loop
/// - `UnsupportedConversion` for channel reductions other than to mono
/// - `TooLong` if the sound cannot fit the length limit above the minimum rate
/// - `Resample` if the resampler fails
pub fn convert(
    buffer: AudioBuffer,
    request: &ConvertRequest,
    resampler: &dyn Resample,
) -> Result<Converted> {
    if buffer.is_empty() {
        return Err(DcaError::Unknown("sound has no samples".into()));
    }
    if buffer.sample_rate_hz() == 0 {
        return Err(DcaError::Unknown("sound has a sample rate of 0 Hz".into()));
    }

    let source_len = buffer.sample_count();
    let mut loops = LoopPoints {
        start: request.loop_start,
        end: request.loop_end,
    };
    if let Some(start) = loops.start
        && start as usize > source_len
    {
        return Err(DcaError::InvalidLoop {
            start,
            end: loops.end.unwrap_or(source_len as u32),
            length: source_len as u32,
        });
    }
    loops.repair(source_len);

    let format = request.resolved_format();
    let desired_channels = match (request.channels, request.output) {
        (0, OutputKind::Dca) => 1,
        (0, OutputKind::Wav) => buffer.channel_count(),
        (n, _) => n,
    };
    let buffer = reduce_channels(buffer, desired_channels)?;

    let desired_rate = match request.sample_rate_hz {
        0 => buffer.sample_rate_hz(),
        rate => rate,
    };
    let rate = match request.output {
        OutputKind::Dca => dca_rate(&buffer, desired_rate, format, request)?,
        OutputKind::Wav => desired_rate,
    };

    let buffer = if rate != buffer.sample_rate_hz() {
        resample_buffer(buffer, rate, resampler, &mut loops)?
    } else {
        buffer
    };
    loops.repair(buffer.sample_count());

    let buffer = match request.trim_threshold {
        Some(threshold) => {
            let trimmed = trim_silence(buffer, threshold, &mut loops)?;
            loops.repair(trimmed.sample_count());
            trimmed
        }
        None => buffer,
    };

    let target = EncodingTarget {
        format,
        channels: buffer.channel_count(),
        sample_rate_hz: buffer.sample_rate_hz(),
        allow_long: request.allow_long,
        max_samples: request.limits.max_samples,
        loop_start: loops.start,
        loop_end: loops.end,
    };

    Ok(Converted { buffer, target })
}

fn reduce_channels(buffer: AudioBuffer, desired: usize) -> Result<AudioBuffer> {
    let source = buffer.channel_count();
    if desired > source {
        tracing::warn!(
            "Requested {} channels but the source has {}, keeping {}",
            desired,
            source,
            source
        );
        return Ok(buffer);
    }
    if desired == source {
        return Ok(buffer);
    }
    if desired == 1 {
        tracing::info!("Downmixing {} channels to mono", source);
        return Ok(downmix_mono(&buffer));
    }
    Err(DcaError::UnsupportedConversion {
        from: source,
        to: desired,
    })
}

/// Average all channels into one, truncating toward zero
pub fn downmix_mono(buffer: &AudioBuffer) -> AudioBuffer {
    let count = buffer.channel_count() as i32;
    let samples = (0..buffer.sample_count())
        .map(|i| {
            let sum: i32 = buffer.channels().iter().map(|c| c[i] as i32).sum();
            (sum / count) as i16
        })
        .collect();
    AudioBuffer::mono(buffer.sample_rate_hz(), samples)
}

fn scaled_len(len: usize, ratio: f64) -> usize {
    ((len as f64 * ratio).round() as usize).max(1)
}

/// Output rate for a `.dca` file
fn dca_rate(
    buffer: &AudioBuffer,
    desired_rate: u32,
    format: DcaFormat,
    request: &ConvertRequest,
) -> Result<u32> {
    let limits = &request.limits;
    let source_rate = buffer.sample_rate_hz();
    let source_len = buffer.sample_count();

    let rate = clamp_rate(snap_rate(desired_rate), format, limits);

    // Length math uses the rate the hardware will play
    let expected = scaled_len(source_len, rate as f64 / source_rate as f64);
    if request.allow_long || expected <= limits.max_samples {
        return Ok(rate);
    }

    let fitted = fit_rate(source_len, source_rate, limits)?;
    tracing::warn!(
        "Sound would be {} samples, more than the {} the AICA can play. \
         Lowering the rate from {} Hz to {} Hz, use --long to keep it",
        expected,
        limits.max_samples,
        rate,
        fitted
    );
    Ok(fitted)
}

fn snap_rate(rate: u32) -> u32 {
    let snapped = nearest_encodable_rate(rate);
    if snapped != rate {
        tracing::debug!("Snapped {} Hz to encodable {} Hz", rate, snapped);
    }
    snapped
}

fn clamp_rate(rate: u32, format: DcaFormat, limits: &Limits) -> u32 {
    if rate < limits.min_rate_hz {
        tracing::warn!(
            "Sample rate {} Hz is below the minimum, using {} Hz",
            rate,
            limits.min_rate_hz
        );
        limits.min_rate_hz
    } else if format == DcaFormat::Adpcm && rate > limits.max_adpcm_rate_hz {
        tracing::warn!(
            "Sample rate {} Hz is too high for ADPCM, using {} Hz",
            rate,
            limits.max_adpcm_rate_hz
        );
        limits.max_adpcm_rate_hz
    } else {
        rate
    }
}

/// Highest encodable rate at which the resampled sound fits `max_samples`
fn fit_rate(source_len: usize, source_rate: u32, limits: &Limits) -> Result<u32> {
    let too_long = |samples: usize| DcaError::TooLong {
        samples,
        max: limits.max_samples,
    };
    let fits = |rate: u32| scaled_len(source_len, rate as f64 / source_rate as f64);

    let ratio = limits.max_samples as f64 / source_len as f64;
    let mut pitch = AicaPitch::from_hz((source_rate as f64 * ratio).round() as u32);
    let mut rate = pitch.to_hz().round() as u32;

    while fits(rate) > limits.max_samples {
        pitch = pitch.next_lower().ok_or_else(|| too_long(fits(rate)))?;
        rate = pitch.to_hz().round() as u32;
    }
    if rate < limits.min_rate_hz {
        return Err(too_long(fits(limits.min_rate_hz)));
    }

    Ok(rate)
}

fn resample_buffer(
    buffer: AudioBuffer,
    rate: u32,
    resampler: &dyn Resample,
    loops: &mut LoopPoints,
) -> Result<AudioBuffer> {
    let source_rate = buffer.sample_rate_hz();
    let ratio = rate as f64 / source_rate as f64;
    let output_len = scaled_len(buffer.sample_count(), ratio);

    tracing::info!(
        "Converting sample rate from {} Hz to {} Hz ({} -> {} samples)",
        source_rate,
        rate,
        buffer.sample_count(),
        output_len
    );

    let channels = buffer
        .channels()
        .par_iter()
        .map(|samples| {
            let output = resampler.resample(&samples_to_f32(samples), ratio, output_len)?;
            Ok(f32_to_samples(&output))
        })
        .collect::<Result<Vec<Vec<i16>>>>()?;

    loops.scale(ratio);
    AudioBuffer::new(rate, channels)
}

/// Cut silence from both ends, never crossing a loop point
///
/// A sample is loud when any channel exceeds `threshold` in magnitude.
/// Leading silence is only looked for before the loop start, trailing
/// silence only after the loop end. A sound with no loud samples in range
/// is left as it is.
fn trim_silence(buffer: AudioBuffer, threshold: i16, loops: &mut LoopPoints) -> Result<AudioBuffer> {
    let len = buffer.sample_count();
    let threshold = threshold.unsigned_abs();
    let loud = |i: usize| buffer.channels().iter().any(|c| c[i].unsigned_abs() > threshold);

    let head_limit = loops.start.map_or(len, |s| s as usize).min(len);
    let start = (0..head_limit).find(|&i| loud(i)).unwrap_or(head_limit);

    let tail_limit = match (loops.end, loops.start) {
        (Some(end), _) => end as usize,
        (None, Some(start)) => start as usize + 1,
        (None, None) => 0,
    }
    .min(len);
    let end = (tail_limit..len)
        .rev()
        .find(|&i| loud(i))
        .map_or(tail_limit, |i| i + 1);

    if start >= end {
        tracing::warn!("Sound is silent at threshold {}, not trimming", threshold);
        return Ok(buffer);
    }
    if start == 0 && end == len {
        return Ok(buffer);
    }

    tracing::info!(
        "Trimmed {} leading and {} trailing silent samples",
        start,
        len - end
    );

    let rate = buffer.sample_rate_hz();
    let channels = buffer
        .into_channels()
        .into_iter()
        .map(|c| c[start..end].to_vec())
        .collect();
    loops.shift(start);
    AudioBuffer::new(rate, channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resample::LinearResampler;

    fn tone(len: usize, amplitude: f32) -> Vec<i16> {
        (0..len)
            .map(|i| ((i as f32 * 0.05).sin() * amplitude) as i16)
            .collect()
    }

    fn dca_request() -> ConvertRequest {
        ConvertRequest::new(OutputKind::Dca)
    }

    fn run(buffer: AudioBuffer, request: &ConvertRequest) -> Result<Converted> {
        convert(buffer, request, &LinearResampler)
    }

    fn assert_loop_invariants(converted: &Converted) {
        let length = converted.buffer.sample_count() as u32;
        let (start, end) = converted.target.loop_range(length);
        assert!(start <= end && end <= length, "{}..{} of {}", start, end, length);
        if converted.target.is_looping() {
            assert!(start < end);
        }
    }

    #[test]
    fn test_stereo_48k_to_mono_adpcm() {
        let source = AudioBuffer::new(48000, vec![tone(48000, 8000.0), tone(48000, 4000.0)]).unwrap();
        let request = ConvertRequest {
            sample_rate_hz: 22050,
            ..dca_request()
        };

        let converted = run(source, &request).unwrap();
        assert_eq!(converted.target.format, DcaFormat::Adpcm);
        assert_eq!(converted.buffer.channel_count(), 1);
        assert_eq!(converted.target.channels, 1);
        assert_eq!(converted.buffer.sample_rate_hz(), nearest_encodable_rate(22050));
        assert_eq!(converted.buffer.sample_count(), 22050);
        assert!(!converted.target.is_looping());
    }

    #[test]
    fn test_dca_defaults_to_source_rate() {
        let source = AudioBuffer::mono(44100, tone(1000, 1000.0));
        let converted = run(source.clone(), &dca_request()).unwrap();
        assert_eq!(converted.buffer, source);
    }

    #[test]
    fn test_rate_is_snapped() {
        let source = AudioBuffer::mono(48000, tone(4800, 1000.0));
        let converted = run(source, &dca_request()).unwrap();
        assert_eq!(converted.buffer.sample_rate_hz(), 48019);
        assert_eq!(converted.buffer.sample_count(), 4802);
    }

    #[test]
    fn test_long_sound_rate_reduced() {
        let source = AudioBuffer::mono(44100, tone(100_000, 1000.0));
        let converted = run(source, &dca_request()).unwrap();

        let rate = converted.buffer.sample_rate_hz();
        assert!(rate < 44100 && rate >= MIN_SAMPLE_RATE_HZ);
        assert_eq!(nearest_encodable_rate(rate), rate);
        assert!(converted.buffer.sample_count() <= dca_common::DEFAULT_MAX_SAMPLES);
        // Highest rate that fits, not just any
        assert!(converted.buffer.sample_count() > dca_common::DEFAULT_MAX_SAMPLES - 100);
    }

    #[test]
    fn test_snapped_rate_still_fits() {
        // 48000 Hz snaps up to 48019 Hz, which would push this past the cap
        let source = AudioBuffer::mono(48000, tone(65470, 1000.0));
        let converted = run(source, &dca_request()).unwrap();

        assert!(converted.buffer.sample_rate_hz() < 48000);
        assert!(converted.buffer.sample_count() <= dca_common::DEFAULT_MAX_SAMPLES);
        assert!(dca_common::encode_dca(&converted.buffer, &converted.target).is_ok());
    }

    #[test]
    fn test_long_sound_kept_with_allow_long() {
        let source = AudioBuffer::mono(44100, tone(70_000, 1000.0));
        let request = ConvertRequest {
            allow_long: true,
            ..dca_request()
        };
        let converted = run(source, &request).unwrap();
        assert_eq!(converted.buffer.sample_rate_hz(), 44100);
        assert_eq!(converted.buffer.sample_count(), 70_000);
        assert!(converted.target.allow_long);
    }

    #[test]
    fn test_too_long_below_min_rate() {
        let source = AudioBuffer::mono(8000, tone(10_000, 1000.0));
        let request = ConvertRequest {
            limits: Limits {
                max_samples: 100,
                ..Limits::default()
            },
            ..dca_request()
        };
        assert!(matches!(run(source, &request), Err(DcaError::TooLong { max: 100, .. })));
    }

    #[test]
    fn test_length_margin() {
        assert_eq!(Limits::with_length_margin(64).max_samples, 65472);
        assert_eq!(Limits::with_length_margin(0).max_samples, 65536);

        let source = AudioBuffer::mono(22050, tone(65500, 1000.0));
        let request = ConvertRequest {
            limits: Limits::with_length_margin(0),
            ..dca_request()
        };
        let converted = run(source, &request).unwrap();
        assert_eq!(converted.buffer.sample_count(), 65500);
    }

    #[test]
    fn test_rate_clamped_to_range() {
        let source = AudioBuffer::mono(8000, tone(800, 1000.0));
        let request = ConvertRequest {
            sample_rate_hz: 100,
            ..dca_request()
        };
        let converted = run(source, &request).unwrap();
        assert_eq!(converted.buffer.sample_rate_hz(), MIN_SAMPLE_RATE_HZ);

        let source = AudioBuffer::mono(96000, tone(960, 1000.0));
        let converted = run(source.clone(), &dca_request()).unwrap();
        assert_eq!(converted.buffer.sample_rate_hz(), MAX_ADPCM_SAMPLE_RATE_HZ);

        // PCM plays above the ADPCM limit
        let request = ConvertRequest {
            format: Some(DcaFormat::Pcm16),
            ..dca_request()
        };
        let converted = run(source, &request).unwrap();
        assert_eq!(converted.buffer.sample_rate_hz(), nearest_encodable_rate(96000));
    }

    #[test]
    fn test_downmix_truncates_toward_zero() {
        let source = AudioBuffer::new(22050, vec![vec![3, -3, 1], vec![4, -4, 0]]).unwrap();
        let mono = downmix_mono(&source);
        assert_eq!(mono.channel(0), &[3, -3, 0]);
    }

    #[test]
    fn test_upmix_keeps_source_channels() {
        let source = AudioBuffer::mono(22050, tone(100, 1000.0));
        let request = ConvertRequest {
            channels: 2,
            ..dca_request()
        };
        let converted = run(source, &request).unwrap();
        assert_eq!(converted.target.channels, 1);
    }

    #[test]
    fn test_unsupported_channel_reduction() {
        let source = AudioBuffer::new(22050, vec![vec![0; 10]; 4]).unwrap();
        let request = ConvertRequest {
            channels: 2,
            ..dca_request()
        };
        assert!(matches!(
            run(source, &request),
            Err(DcaError::UnsupportedConversion { from: 4, to: 2 })
        ));
    }

    #[test]
    fn test_wav_keeps_layout() {
        let source = AudioBuffer::new(48000, vec![tone(480, 1000.0), tone(480, 500.0)]).unwrap();
        let converted = run(source.clone(), &ConvertRequest::new(OutputKind::Wav)).unwrap();
        assert_eq!(converted.target.format, DcaFormat::Pcm16);
        assert_eq!(converted.buffer, source);
    }

    #[test]
    fn test_loop_start_past_end_fails() {
        let source = AudioBuffer::mono(22050, tone(1000, 1000.0));
        let request = ConvertRequest {
            loop_start: Some(1001),
            ..dca_request()
        };
        assert!(matches!(run(source, &request), Err(DcaError::InvalidLoop { .. })));
    }

    #[test]
    fn test_loop_start_at_end_disables_loop() {
        let source = AudioBuffer::mono(22050, tone(1000, 1000.0));
        let request = ConvertRequest {
            loop_start: Some(1000),
            ..dca_request()
        };
        let converted = run(source, &request).unwrap();
        assert!(!converted.target.is_looping());
        assert_eq!(converted.buffer.sample_count(), 1000);
    }

    #[test]
    fn test_loop_end_clamped() {
        let source = AudioBuffer::mono(22050, tone(1000, 1000.0));
        let request = ConvertRequest {
            loop_start: Some(100),
            loop_end: Some(5000),
            ..dca_request()
        };
        let converted = run(source, &request).unwrap();
        assert_eq!(converted.target.loop_start, Some(100));
        assert_eq!(converted.target.loop_end, Some(1000));
    }

    #[test]
    fn test_reversed_loop_disabled() {
        let source = AudioBuffer::mono(22050, tone(1000, 1000.0));
        let request = ConvertRequest {
            loop_start: Some(500),
            loop_end: Some(400),
            ..dca_request()
        };
        let converted = run(source, &request).unwrap();
        assert!(!converted.target.is_looping());
    }

    #[test]
    fn test_loop_points_scale_with_rate() {
        let source = AudioBuffer::mono(44100, tone(44100, 1000.0));
        let request = ConvertRequest {
            sample_rate_hz: 22050,
            loop_start: Some(1000),
            loop_end: Some(40000),
            ..dca_request()
        };
        let converted = run(source, &request).unwrap();
        assert_eq!(converted.target.loop_start, Some(500));
        assert_eq!(converted.target.loop_end, Some(20000));
        assert_loop_invariants(&converted);
    }

    #[test]
    fn test_loop_points_truncate_when_scaled() {
        let source = AudioBuffer::mono(44100, tone(44100, 1000.0));
        let request = ConvertRequest {
            sample_rate_hz: 22050,
            loop_start: Some(1001),
            loop_end: Some(40001),
            ..dca_request()
        };
        let converted = run(source, &request).unwrap();
        assert_eq!(converted.target.loop_start, Some(500));
        assert_eq!(converted.target.loop_end, Some(20000));
    }

    #[test]
    fn test_loop_invariants_hold() {
        let cases = [
            (None, None),
            (Some(0), None),
            (None, Some(999)),
            (Some(10), Some(11)),
            (Some(998), None),
            (Some(0), Some(u32::MAX)),
        ];
        for (loop_start, loop_end) in cases {
            for rate in [0, 8000, 44100] {
                let source = AudioBuffer::mono(22050, tone(999, 1000.0));
                let request = ConvertRequest {
                    sample_rate_hz: rate,
                    loop_start,
                    loop_end,
                    trim_threshold: Some(DEFAULT_TRIM_THRESHOLD),
                    ..dca_request()
                };
                assert_loop_invariants(&run(source, &request).unwrap());
            }
        }
    }

    #[test]
    fn test_trim_silence() {
        let mut samples = vec![0i16; 100];
        samples.extend(tone(800, 10000.0).iter().map(|&s| s.saturating_add(1000)));
        samples.extend(vec![10; 100]);
        let source = AudioBuffer::mono(22050, samples);

        let request = ConvertRequest {
            trim_threshold: Some(DEFAULT_TRIM_THRESHOLD),
            ..dca_request()
        };
        let converted = run(source, &request).unwrap();
        assert_eq!(converted.buffer.sample_count(), 800);
    }

    #[test]
    fn test_trim_respects_loop_points() {
        let mut samples = vec![0i16; 100];
        samples.extend(vec![5000; 800]);
        samples.extend(vec![0; 100]);
        let source = AudioBuffer::mono(22050, samples);

        // Loop covers silence on both sides; nothing inside it may go
        let request = ConvertRequest {
            trim_threshold: Some(DEFAULT_TRIM_THRESHOLD),
            loop_start: Some(50),
            loop_end: Some(950),
            ..dca_request()
        };
        let converted = run(source.clone(), &request).unwrap();
        assert_eq!(converted.buffer.sample_count(), 900);
        assert_eq!(converted.target.loop_start, Some(0));
        assert_eq!(converted.target.loop_end, Some(900));

        // Leading silence before the loop start is cut and the loop shifts
        let request = ConvertRequest {
            trim_threshold: Some(DEFAULT_TRIM_THRESHOLD),
            loop_start: Some(500),
            ..dca_request()
        };
        let converted = run(source, &request).unwrap();
        assert_eq!(converted.buffer.sample_count(), 800);
        assert_eq!(converted.target.loop_start, Some(400));
        assert_eq!(converted.target.loop_end, None);
    }

    #[test]
    fn test_trim_silent_sound_untouched() {
        let source = AudioBuffer::mono(22050, vec![0; 500]);
        let request = ConvertRequest {
            trim_threshold: Some(DEFAULT_TRIM_THRESHOLD),
            ..dca_request()
        };
        let converted = run(source, &request).unwrap();
        assert_eq!(converted.buffer.sample_count(), 500);
    }

    #[test]
    fn test_empty_sound_rejected() {
        let source = AudioBuffer::mono(22050, vec![]);
        assert!(run(source, &dca_request()).is_err());
    }
}
