//! Sound loaders

use std::fs::File;
use std::path::Path;

use dca_common::{AudioBuffer, DCA_EXT, DcaError, Result, decode_dca};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Input file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Wav,
    Flac,
    Mp3,
    Vorbis,
    Dca,
}

impl InputKind {
    /// Detect format by extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match super::extension(path)?.as_str() {
            "wav" => Ok(Self::Wav),
            "flac" => Ok(Self::Flac),
            "mp3" => Ok(Self::Mp3),
            "ogg" | "oga" => Ok(Self::Vorbis),
            DCA_EXT => Ok(Self::Dca),
            other => Err(DcaError::UnsupportedFileType(format!(
                "{} (use .wav, .flac, .mp3, .ogg or .{})",
                other, DCA_EXT
            ))),
        }
    }
}

/// A decoded input file
#[derive(Debug, Clone)]
pub struct LoadedSound {
    pub kind: InputKind,
    pub buffer: AudioBuffer,
    /// Loop stored in the file, if the format has one
    pub loop_points: Option<(u32, u32)>,
}

/// Load any supported sound file to 16-bit PCM
pub fn load_sound(path: &Path) -> Result<LoadedSound> {
    let kind = InputKind::from_path(path)?;

    let (buffer, loop_points) = match kind {
        InputKind::Wav => (load_wav(path)?, None),
        InputKind::Flac | InputKind::Mp3 | InputKind::Vorbis => (load_compressed(path)?, None),
        InputKind::Dca => {
            let data = std::fs::read(path).map_err(|source| DcaError::ReadOpen {
                path: path.to_path_buf(),
                source,
            })?;
            let file = decode_dca(&data)?;
            let loop_points = file.loop_points();
            (file.buffer, loop_points)
        }
    };

    if buffer.is_empty() {
        return Err(DcaError::Read(format!("{:?} contains no samples", path)));
    }

    Ok(LoadedSound {
        kind,
        buffer,
        loop_points,
    })
}

fn hound_read_error(path: &Path, error: hound::Error) -> DcaError {
    match error {
        hound::Error::IoError(source) => DcaError::ReadOpen {
            path: path.to_path_buf(),
            source,
        },
        other => DcaError::Read(format!("{:?}: {}", path, other)),
    }
}

fn load_wav(path: &Path) -> Result<AudioBuffer> {
    let mut reader = hound::WavReader::open(path).map_err(|e| hound_read_error(path, e))?;
    let spec = reader.spec();
    let read_err = |e: hound::Error| DcaError::Read(format!("{:?}: {}", path, e));

    let samples: Vec<i16> = match spec.sample_format {
        hound::SampleFormat::Int => match spec.bits_per_sample {
            16 => reader.samples::<i16>().collect::<Result<_, _>>().map_err(read_err)?,
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|s| (s as i16) << 8))
                .collect::<Result<_, _>>()
                .map_err(read_err)?,
            bits @ (24 | 32) => reader
                .samples::<i32>()
                .map(|s| s.map(|s| (s >> (bits - 16)) as i16))
                .collect::<Result<_, _>>()
                .map_err(read_err)?,
            bits => {
                return Err(DcaError::Read(format!(
                    "{:?}: unsupported bit depth {}",
                    path, bits
                )));
            }
        },
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(|s| (s * 32768.0).clamp(i16::MIN as f32, i16::MAX as f32) as i16))
            .collect::<Result<_, _>>()
            .map_err(read_err)?,
    };

    let channels = spec.channels as usize;
    let expected = reader.duration() as usize * channels;
    if samples.len() < expected {
        return Err(DcaError::Read(format!(
            "{:?}: short read ({} of {} samples)",
            path,
            samples.len(),
            expected
        )));
    }

    AudioBuffer::from_interleaved(spec.sample_rate, channels, &samples)
}

/// FLAC, MP3 and Vorbis through symphonia
fn load_compressed(path: &Path) -> Result<AudioBuffer> {
    let file = File::open(path).map_err(|source| DcaError::ReadOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let read_err = |e: SymphoniaError| DcaError::Read(format!("{:?}: {}", path, e));

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(read_err)?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| DcaError::Read(format!("{:?}: no audio track found", path)))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut sample_rate = codec_params.sample_rate;
    let mut channels = codec_params.channels.map(|c| c.count());

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(read_err)?;

    let mut samples: Vec<i16> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<i16>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(read_err(e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!("Skipping undecodable packet in {:?}: {}", path, e);
                continue;
            }
            Err(e) => return Err(read_err(e)),
        };

        let spec = *decoded.spec();
        sample_rate.get_or_insert(spec.rate);
        channels.get_or_insert(spec.channels.count());

        let buf = sample_buf.get_or_insert_with(|| SampleBuffer::new(decoded.capacity() as u64, spec));
        if buf.capacity() < decoded.capacity() * spec.channels.count() {
            *buf = SampleBuffer::new(decoded.capacity() as u64, spec);
        }
        buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buf.samples());
    }

    let sample_rate =
        sample_rate.ok_or_else(|| DcaError::Read(format!("{:?}: unknown sample rate", path)))?;
    let channels =
        channels.ok_or_else(|| DcaError::Read(format!("{:?}: unknown channel count", path)))?;

    AudioBuffer::from_interleaved(sample_rate, channels, &samples)
}
