//! Sound writers
//!
//! A failed write never leaves a partial file behind.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use dca_common::{AudioBuffer, DcaError, EncodingTarget, Result, decode_dca, encode_dca};

fn write_error(path: &Path, source: std::io::Error) -> DcaError {
    DcaError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Run `write` against a fresh file at `path`, removing it on failure
fn write_file<F>(path: &Path, write: F) -> Result<usize>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let file = File::create(path).map_err(|source| DcaError::WriteOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    let result = write(&mut writer)
        .and_then(|()| writer.flush())
        .and_then(|()| writer.get_ref().sync_all())
        .and_then(|()| writer.get_ref().metadata());

    match result {
        Ok(metadata) => Ok(metadata.len() as usize),
        Err(source) => {
            drop(writer);
            let _ = std::fs::remove_file(path);
            Err(write_error(path, source))
        }
    }
}

/// Encode and write a `.dca` file, returning its size
pub fn write_dca(path: &Path, buffer: &AudioBuffer, target: &EncodingTarget) -> Result<usize> {
    let data = encode_dca(buffer, target)?;
    tracing::debug!("Writing {} bytes to {:?}", data.len(), path);
    write_file(path, |w| w.write_all(&data))
}

/// Write a 16-bit PCM WAV file, returning its size
pub fn write_wav(path: &Path, buffer: &AudioBuffer) -> Result<usize> {
    let spec = hound::WavSpec {
        channels: buffer.channel_count() as u16,
        sample_rate: buffer.sample_rate_hz(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let samples = buffer.interleaved();

    write_file(path, |w| {
        let mut wav = hound::WavWriter::new(w, spec).map_err(hound_to_io)?;
        for sample in samples {
            wav.write_sample(sample).map_err(hound_to_io)?;
        }
        wav.finalize().map_err(hound_to_io)
    })
}

/// Decode a written `.dca` file back to a WAV for listening
pub fn write_preview(dca_path: &Path, preview_path: &Path) -> Result<()> {
    let data = std::fs::read(dca_path).map_err(|source| DcaError::ReadOpen {
        path: dca_path.to_path_buf(),
        source,
    })?;
    let file = decode_dca(&data)?;
    write_wav(preview_path, &file.buffer)?;
    tracing::info!("Wrote preview {:?}", preview_path);
    Ok(())
}

fn hound_to_io(error: hound::Error) -> std::io::Error {
    match error {
        hound::Error::IoError(e) => e,
        other => std::io::Error::other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dca_common::{DcaFormat, DcaHeader};
    use tempfile::tempdir;

    #[test]
    fn test_write_dca() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.dca");
        let buffer = AudioBuffer::mono(22050, (0..1000).map(|i| (i * 30) as i16).collect());

        let size = write_dca(&path, &buffer, &EncodingTarget::new(DcaFormat::Pcm16)).unwrap();
        let data = std::fs::read(&path).unwrap();
        assert_eq!(data.len(), size);
        assert!(DcaHeader::from_bytes(&data).unwrap().validate());
    }

    #[test]
    fn test_failed_encode_leaves_no_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("long.dca");
        let buffer = AudioBuffer::mono(22050, vec![0; 100]);
        let target = EncodingTarget {
            max_samples: 10,
            ..EncodingTarget::default()
        };

        assert!(matches!(
            write_dca(&path, &buffer, &target),
            Err(DcaError::TooLong { .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_write_removes_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.bin");

        let result = write_file(&path, |w| {
            w.write_all(&[0; 64])?;
            Err(std::io::Error::other("disk full"))
        });
        assert!(matches!(result, Err(DcaError::Write { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_open_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.wav");
        let buffer = AudioBuffer::mono(22050, vec![0; 10]);
        assert!(matches!(write_wav(&path, &buffer), Err(DcaError::WriteOpen { .. })));
    }

    #[test]
    fn test_wav_roundtrip_through_hound() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let buffer = AudioBuffer::new(32000, vec![vec![1, 2, 3], vec![-1, -2, -3]]).unwrap();
        write_wav(&path, &buffer).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 32000);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![1, -1, 2, -2, 3, -3]);
    }

    #[test]
    fn test_preview_decodes_dca() {
        let dir = tempdir().unwrap();
        let dca = dir.path().join("s.dca");
        let wav = dir.path().join("s.wav");
        let buffer = AudioBuffer::mono(44100, vec![0x1234; 50]);

        write_dca(&dca, &buffer, &EncodingTarget::new(DcaFormat::Pcm8)).unwrap();
        write_preview(&dca, &wav).unwrap();

        let mut reader = hound::WavReader::open(&wav).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0x1200; 50]);
    }
}
