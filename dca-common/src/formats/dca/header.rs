//! DCA header structure and operations

use super::{
    DCA_ALIGNMENT, DCA_HEADER_SIZE, DCA_MAGIC, DCA_MAX_VERSION, DCA_VERSION, channel_size_bytes,
    dca_flags,
};
use crate::limits::{AICA_MAX_SAMPLES, MAX_CHANNELS};
use crate::pitch::{AicaPitch, decode_rate};
use crate::sound::DcaFormat;
use crate::{DcaError, Result};

/// Longest sound whose file size still fits the 32-bit size field
fn max_length_for(format: DcaFormat, channels: usize) -> usize {
    let per_channel = (u32::MAX as usize - DCA_HEADER_SIZE) / channels.max(1) - DCA_ALIGNMENT;
    match format {
        DcaFormat::Pcm16 => per_channel / 2,
        DcaFormat::Pcm8 => per_channel,
        DcaFormat::Adpcm => per_channel * 2,
    }
}

/// DcAudio header (32 bytes)
///
/// Note: Not packed - we use explicit byte serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DcaHeader {
    pub magic: [u8; 4],
    /// Size of the whole file, header included
    pub chunk_size: u32,
    pub version: u8,
    pub flags: u16,
    /// AICA pitch register value
    pub sample_rate_code: u16,
    /// Samples per channel
    pub length: u32,
    pub loop_start: u32,
    pub loop_end: u32,
}

impl DcaHeader {
    pub const SIZE: usize = DCA_HEADER_SIZE;

    /// Header describing a sound about to be written
    ///
    /// `loop_points` is `Some((start, end))` for a looping sound. Without a
    /// loop the header stores `loop_start = 0` and `loop_end = length`,
    /// which is what simple one-shot playback programs into the AICA.
    ///
    /// # Errors
    /// `TooLong` if the file size does not fit the 32-bit size field.
    pub fn for_sound(
        format: DcaFormat,
        channels: usize,
        sample_rate_hz: u32,
        length: u32,
        loop_points: Option<(u32, u32)>,
    ) -> Result<Self> {
        let channel_size = channel_size_bytes(format, length as usize);
        let chunk_size = channel_size
            .checked_mul(channels)
            .and_then(|size| size.checked_add(DCA_HEADER_SIZE))
            .and_then(|size| u32::try_from(size).ok())
            .ok_or_else(|| DcaError::TooLong {
                samples: length as usize,
                max: max_length_for(format, channels),
            })?;

        let mut flags = ((format.selector() as u16 & dca_flags::FORMAT_MASK)
            << dca_flags::FORMAT_SHIFT)
            | (channels as u16 & dca_flags::CHANNEL_COUNT_MASK);
        if length as usize > AICA_MAX_SAMPLES {
            flags |= dca_flags::LONG;
        }

        let (loop_start, loop_end) = match loop_points {
            Some(points) => {
                flags |= dca_flags::LOOPING;
                points
            }
            None => (0, length),
        };

        Ok(Self {
            magic: DCA_MAGIC,
            chunk_size,
            version: DCA_VERSION,
            flags,
            sample_rate_code: AicaPitch::from_hz(sample_rate_hz).code(),
            length,
            loop_start,
            loop_end,
        })
    }

    /// Channel count; a stored 0 means 8
    pub fn channel_count(&self) -> usize {
        match (self.flags & dca_flags::CHANNEL_COUNT_MASK) as usize {
            0 => MAX_CHANNELS,
            n => n,
        }
    }

    /// Sample format, or `None` for the invalid selector
    pub fn format(&self) -> Option<DcaFormat> {
        DcaFormat::from_selector(
            ((self.flags >> dca_flags::FORMAT_SHIFT) & dca_flags::FORMAT_MASK) as u8,
        )
    }

    pub fn is_looping(&self) -> bool {
        self.flags & dca_flags::LOOPING != 0
    }

    pub fn is_long(&self) -> bool {
        self.flags & dca_flags::LONG != 0
    }

    /// Flag bits to OR into the AICA channel register
    pub fn aica_flags(&self) -> u16 {
        self.flags & dca_flags::AICA_MASK
    }

    /// Playback rate decoded from the pitch code
    pub fn sample_rate_hz(&self) -> f64 {
        decode_rate(self.sample_rate_code)
    }

    /// Size of one channel block, or `None` for an invalid format
    pub fn channel_size(&self) -> Option<usize> {
        self.format()
            .map(|format| channel_size_bytes(format, self.length as usize))
    }

    /// File size implied by the channel layout
    pub fn expected_file_size(&self) -> Option<usize> {
        self.channel_size()
            .map(|size| DCA_HEADER_SIZE + size * self.channel_count())
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..8].copy_from_slice(&self.chunk_size.to_le_bytes());
        bytes[8] = self.version;
        // 0x09..0x0C reserved
        bytes[12..14].copy_from_slice(&self.flags.to_le_bytes());
        bytes[14..16].copy_from_slice(&self.sample_rate_code.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.length.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.loop_start.to_le_bytes());
        bytes[24..28].copy_from_slice(&self.loop_end.to_le_bytes());
        // 0x1C..0x20 reserved
        bytes
    }

    /// Read header from bytes
    ///
    /// Only checks that enough bytes are present; use [`DcaHeader::validate`]
    /// before trusting the fields.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let u32_at = |offset: usize| {
            u32::from_le_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ])
        };
        Some(Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            chunk_size: u32_at(4),
            version: bytes[8],
            flags: u16::from_le_bytes([bytes[12], bytes[13]]),
            sample_rate_code: u16::from_le_bytes([bytes[14], bytes[15]]),
            length: u32_at(16),
            loop_start: u32_at(20),
            loop_end: u32_at(24),
        })
    }

    /// Validate header
    ///
    /// A header that fails this check is corrupt; nothing it describes can
    /// be trusted.
    pub fn validate(&self) -> bool {
        let chunk_size = self.chunk_size as usize;

        chunk_size > Self::SIZE
            && self.magic == DCA_MAGIC
            && self.version < DCA_MAX_VERSION
            && chunk_size % DCA_ALIGNMENT == 0
            && self.expected_file_size() == Some(chunk_size)
            && self.loop_start <= self.loop_end
            && self.loop_end <= self.length
            && self.sample_rate_code & 0x8000 == 0
    }
}
