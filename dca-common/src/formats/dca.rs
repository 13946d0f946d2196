//! DcAudio binary format (.dca)
//!
//! Dreamcast sound container. All values are little-endian (same as the
//! SH-4). The header is followed by one block per channel; every block is
//! padded to a multiple of 32 bytes so it can be DMA'd to sound RAM as is.
//!
//! # Layout
//! ```text
//! Header (32 bytes):
//! 0x00: magic [u8; 4]          - "DcAF"
//! 0x04: chunk_size u32 LE      - Size of the whole file, multiple of 32
//! 0x08: version u8             - 0
//! 0x09: reserved (3 bytes)
//! 0x0C: flags u16 LE           - See `dca_flags`
//! 0x0E: sample_rate_code u16   - AICA pitch register value, bit 15 clear
//! 0x10: length u32 LE          - Samples per channel
//! 0x14: loop_start u32 LE      - First sample of the loop
//! 0x18: loop_end u32 LE        - Loop end (exclusive, register = loop_end - 1)
//! 0x1C: reserved (4 bytes)
//!
//! Channel data (channel_count × channel_size_bytes):
//! PCM16: length × i16 LE, PCM8: length × i8, ADPCM: ceil(length / 2) bytes
//! ```
//!
//! # Flags
//! - Bits 0-2: Channel count (0 = 8 channels)
//! - Bits 7-8: Format (0 = PCM16, 1 = PCM8, 2 = ADPCM)
//! - Bit 9: Looping
//! - Bit 10: Long (longer than the AICA can address, needs streaming)
//!
//! Bits 7-9 line up with the AICA channel register, so a player can mask
//! them straight in.

mod container;
mod header;


pub use container::{DcaFile, decode_dca, encode_dca, read_dca};
pub use header::DcaHeader;

use crate::sound::DcaFormat;

/// File magic
pub const DCA_MAGIC: [u8; 4] = *b"DcAF";

/// Current format version
pub const DCA_VERSION: u8 = 0;

/// Versions at or above this are rejected
pub const DCA_MAX_VERSION: u8 = 50;

/// Header size in bytes
pub const DCA_HEADER_SIZE: usize = 32;

/// File extension
pub const DCA_EXT: &str = "dca";

/// Alignment of the file and every channel block
pub const DCA_ALIGNMENT: usize = 32;

/// Header flag bits
pub mod dca_flags {
    /// Channel count (stored modulo 8)
    pub const CHANNEL_COUNT_MASK: u16 = 0x7;

    pub const FORMAT_SHIFT: u16 = 7;
    pub const FORMAT_MASK: u16 = 0x3;

    /// Sound has a loop
    pub const LOOPING: u16 = 1 << 9;

    /// Sound exceeds the AICA's addressable length
    pub const LONG: u16 = 1 << 10;

    /// Bits that map directly onto the AICA channel register
    pub const AICA_MASK: u16 = (FORMAT_MASK << FORMAT_SHIFT) | LOOPING;
}

/// Size of one channel block in bytes, padded to [`DCA_ALIGNMENT`]
pub fn channel_size_bytes(format: DcaFormat, total_length: usize) -> usize {
    let raw = match format {
        DcaFormat::Pcm16 => total_length * 2,
        DcaFormat::Pcm8 => total_length,
        DcaFormat::Adpcm => aica_adpcm::encoded_len(total_length),
    };
    raw.next_multiple_of(DCA_ALIGNMENT)
}
