//! Whole-file encoding and decoding

use super::{DCA_HEADER_SIZE, DCA_MAGIC, DcaHeader, channel_size_bytes};
use crate::limits::MAX_CHANNELS;
use crate::sound::{AudioBuffer, DcaFormat, EncodingTarget};
use crate::{DcaError, Result};

/// A decoded `.dca` file
#[derive(Debug, Clone)]
pub struct DcaFile {
    pub header: DcaHeader,
    /// Samples decoded back to 16-bit PCM
    pub buffer: AudioBuffer,
}

impl DcaFile {
    pub fn format(&self) -> DcaFormat {
        // decode_dca only produces validated headers
        self.header.format().unwrap_or(DcaFormat::Pcm16)
    }

    /// Loop points, if the file loops
    pub fn loop_points(&self) -> Option<(u32, u32)> {
        self.header
            .is_looping()
            .then_some((self.header.loop_start, self.header.loop_end))
    }
}

/// Encode a sound to a complete `.dca` file
///
/// # Errors
/// - `TooManyChannels` if the buffer has more channels than the container holds
/// - `UnsupportedConversion` if `target.channels` is set and differs from the buffer
/// - `Unknown` if `target.sample_rate_hz` is set and differs from the buffer
/// - `TooLong` if the sound exceeds `target.max_samples` and long sounds are not
///   allowed, or the file would not fit the 32-bit size field
/// - `InvalidLoop` if the loop range does not fit inside the sound
pub fn encode_dca(buffer: &AudioBuffer, target: &EncodingTarget) -> Result<Vec<u8>> {
    let channels = buffer.channel_count();
    let length = buffer.sample_count();

    if channels > MAX_CHANNELS {
        return Err(DcaError::TooManyChannels {
            channels,
            max: MAX_CHANNELS,
        });
    }
    if target.channels != 0 && target.channels != channels {
        return Err(DcaError::UnsupportedConversion {
            from: channels,
            to: target.channels,
        });
    }
    if target.sample_rate_hz != 0 && target.sample_rate_hz != buffer.sample_rate_hz() {
        return Err(DcaError::Unknown(format!(
            "target rate {} Hz does not match the sound's {} Hz",
            target.sample_rate_hz,
            buffer.sample_rate_hz()
        )));
    }
    if !target.allow_long && length > target.max_samples {
        return Err(DcaError::TooLong {
            samples: length,
            max: target.max_samples,
        });
    }
    if length == 0 {
        return Err(DcaError::Unknown("cannot write a zero-length sound".into()));
    }
    let length_u32 = u32::try_from(length).map_err(|_| DcaError::TooLong {
        samples: length,
        max: u32::MAX as usize,
    })?;

    let (loop_start, loop_end) = target.loop_range(length_u32);
    if loop_start > loop_end || loop_end > length_u32 {
        return Err(DcaError::InvalidLoop {
            start: loop_start,
            end: loop_end,
            length: length_u32,
        });
    }
    let loop_points = target.is_looping().then_some((loop_start, loop_end));

    let header = DcaHeader::for_sound(
        target.format,
        channels,
        buffer.sample_rate_hz(),
        length_u32,
        loop_points,
    )?;
    let channel_size = channel_size_bytes(target.format, length);

    let mut data = Vec::with_capacity(header.chunk_size as usize);
    data.extend_from_slice(&header.to_bytes());

    for samples in buffer.channels() {
        let start = data.len();
        match target.format {
            DcaFormat::Pcm16 => {
                for sample in samples {
                    data.extend_from_slice(&sample.to_le_bytes());
                }
            }
            DcaFormat::Pcm8 => data.extend(samples.iter().map(|&s| (s >> 8) as u8)),
            DcaFormat::Adpcm => data.extend_from_slice(&aica_adpcm::encode(samples)),
        }
        data.resize(start + channel_size, 0);
    }

    debug_assert_eq!(data.len(), header.chunk_size as usize);
    Ok(data)
}

/// Decode a complete `.dca` file
///
/// # Errors
/// Returns `DcaError::Read` if the data is too short, the magic does not
/// match, or the header fails validation.
pub fn decode_dca(data: &[u8]) -> Result<DcaFile> {
    let header = DcaHeader::from_bytes(data).ok_or_else(|| {
        DcaError::Read(format!(
            "file too small for DCA header ({} < {} bytes)",
            data.len(),
            DCA_HEADER_SIZE
        ))
    })?;

    if header.magic != DCA_MAGIC {
        return Err(DcaError::Read(format!(
            "bad magic {:02x?} (expected \"DcAF\")",
            header.magic
        )));
    }
    if !header.validate() {
        return Err(DcaError::Read("invalid DCA header".into()));
    }
    if data.len() < header.chunk_size as usize {
        return Err(DcaError::Read(format!(
            "truncated DCA data ({} of {} bytes)",
            data.len(),
            header.chunk_size
        )));
    }

    let format = header
        .format()
        .ok_or_else(|| DcaError::Read("invalid sample format".into()))?;
    let length = header.length as usize;
    let channel_size = channel_size_bytes(format, length);

    let channels = (0..header.channel_count())
        .map(|ch| {
            let start = DCA_HEADER_SIZE + ch * channel_size;
            let block = &data[start..start + channel_size];
            match format {
                DcaFormat::Pcm16 => block
                    .chunks_exact(2)
                    .take(length)
                    .map(|b| i16::from_le_bytes([b[0], b[1]]))
                    .collect(),
                DcaFormat::Pcm8 => block[..length]
                    .iter()
                    .map(|&b| (b as i8 as i16) << 8)
                    .collect(),
                DcaFormat::Adpcm => aica_adpcm::decode(block, length),
            }
        })
        .collect();

    let sample_rate_hz = header.sample_rate_hz().round() as u32;
    let buffer = AudioBuffer::new(sample_rate_hz, channels)?;

    Ok(DcaFile { header, buffer })
}

/// Decode a `.dca` file to samples only
pub fn read_dca(data: &[u8]) -> Result<AudioBuffer> {
    decode_dca(data).map(|file| file.buffer)
}
