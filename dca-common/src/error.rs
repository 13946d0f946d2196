//! Error kinds for loading, converting and writing Dreamcast audio
//!
//! Every error is terminal for the conversion that raised it. I/O problems
//! (`ReadOpen`, `WriteOpen`, `Write`) are kept apart from corrupt input
//! (`Read`) and from policy violations (`TooManyChannels`, `TooLong`,
//! `UnsupportedConversion`, `InvalidLoop`) so callers can report each one
//! distinctly.

use std::path::PathBuf;

/// Result alias used throughout the DCA crates
pub type Result<T, E = DcaError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum DcaError {
    #[error("could not open {path:?} for reading: {source}")]
    ReadOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not open {path:?} for writing: {source}")]
    WriteOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("file name not specified")]
    NoFileName,

    #[error("too many channels: {channels} (maximum is {max})")]
    TooManyChannels { channels: usize, max: usize },

    #[error("sound is too long: {samples} samples (maximum is {max}, use long sounds to allow more)")]
    TooLong { samples: usize, max: usize },

    /// Corrupt, truncated or otherwise undecodable input
    #[error("error while reading: {0}")]
    Read(String),

    #[error("error while writing {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot convert from {from} channels to {to} channels")]
    UnsupportedConversion { from: usize, to: usize },

    #[error("invalid loop: start {start}, end {end}, length {length}")]
    InvalidLoop { start: u32, end: u32, length: u32 },

    #[error("sample rate conversion failed: {0}")]
    Resample(String),

    #[error("{0}")]
    Unknown(String),
}
