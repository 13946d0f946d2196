//! Shared types and utilities for Dreamcast audio
//!
//! This crate provides the pieces shared between:
//! - `dca-conv` (conversion pipeline and `dcaconv` CLI)
//! - anything that needs to read `.dca` files back
//!
//! # Modules
//!
//! - [`pitch`] - AICA 15-bit floating point sample rate encoding
//! - [`sound`] - In-memory sample buffers and encoding targets
//! - [`formats`] - The `.dca` container (header, validation, channel framing)
//! - [`limits`] - Hardware constants of the AICA
//! - [`error`] - Error kinds shared by every stage

pub mod error;
pub mod formats;
pub mod limits;
pub mod pitch;
pub mod sound;

pub use error::{DcaError, Result};

pub use pitch::{AicaPitch, decode_rate, encode_rate, nearest_encodable_rate};

pub use sound::{AudioBuffer, DcaFormat, EncodingTarget};

pub use limits::{
    AICA_MAX_SAMPLES, DEFAULT_LENGTH_MARGIN, DEFAULT_MAX_SAMPLES, MAX_ADPCM_SAMPLE_RATE_HZ,
    MAX_CHANNELS, MIN_SAMPLE_RATE_HZ,
};

pub use formats::{
    DCA_EXT, DCA_HEADER_SIZE, DCA_MAGIC, DcaFile, DcaHeader, channel_size_bytes, decode_dca,
    encode_dca, read_dca,
};
