//! Audio file conversion (WAV/FLAC/MP3/Vorbis/DCA -> .dca or .wav)

mod load;
mod write;

use std::path::Path;

use dca_common::{DCA_EXT, DcaError, Result};

use crate::convert::{self, ConvertRequest, OutputKind};
use crate::resample::Resample;

pub use load::{InputKind, LoadedSound, load_sound};
pub use write::{write_dca, write_preview, write_wav};

/// Lowercased extension of `path`
fn extension(path: &Path) -> Result<String> {
    if path.file_name().is_none() {
        return Err(DcaError::NoFileName);
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .ok_or_else(|| DcaError::UnsupportedFileType(path.display().to_string()))
}

/// Container kind implied by an output path's extension
pub fn output_kind(path: &Path) -> Result<OutputKind> {
    match extension(path)?.as_str() {
        DCA_EXT => Ok(OutputKind::Dca),
        "wav" => Ok(OutputKind::Wav),
        other => Err(DcaError::UnsupportedFileType(format!(
            "{} (output must be .{} or .wav)",
            other, DCA_EXT
        ))),
    }
}

/// Summary of a finished conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub channels: usize,
    pub sample_rate_hz: u32,
    pub samples: usize,
    pub loop_points: Option<(u32, u32)>,
    /// Bytes written to the output file
    pub bytes: usize,
}

/// Convert one file
///
/// Loop points stored in the input (a `.dca` loop, say) are used when the
/// request does not set any of its own.
pub fn convert_file(
    input: &Path,
    output: &Path,
    request: &ConvertRequest,
    resampler: &dyn Resample,
    preview: Option<&Path>,
) -> Result<ConversionReport> {
    let kind = output_kind(output)?;
    let loaded = load_sound(input)?;

    tracing::debug!(
        "Loaded {:?}: {} channels, {} Hz, {} samples",
        input,
        loaded.buffer.channel_count(),
        loaded.buffer.sample_rate_hz(),
        loaded.buffer.sample_count()
    );

    let mut request = ConvertRequest {
        output: kind,
        ..request.clone()
    };
    if request.loop_start.is_none()
        && request.loop_end.is_none()
        && let Some((start, end)) = loaded.loop_points
    {
        request.loop_start = Some(start);
        request.loop_end = Some(end);
    }

    let converted = convert::convert(loaded.buffer, &request, resampler)?;
    let buffer = &converted.buffer;
    let target = &converted.target;

    let bytes = match kind {
        OutputKind::Dca => write_dca(output, buffer, target)?,
        OutputKind::Wav => write_wav(output, buffer)?,
    };

    if let Some(preview) = preview {
        match kind {
            OutputKind::Dca => write_preview(output, preview)?,
            OutputKind::Wav => {
                tracing::warn!("Preview is only written for .dca output, skipping {:?}", preview)
            }
        }
    }

    let length = buffer.sample_count() as u32;
    let report = ConversionReport {
        channels: buffer.channel_count(),
        sample_rate_hz: buffer.sample_rate_hz(),
        samples: buffer.sample_count(),
        loop_points: target.is_looping().then(|| target.loop_range(length)),
        bytes,
    };

    tracing::info!(
        "Converted audio: {} ch, {} samples at {} Hz ({}), {} bytes",
        report.channels,
        report.samples,
        report.sample_rate_hz,
        target.format,
        report.bytes
    );

    Ok(report)
}
