//! dca-conv library
//!
//! Conversion pipeline behind the `dcaconv` tool, usable from other tools
//! that want to produce `.dca` sounds without shelling out.

pub mod audio;
pub mod convert;
pub mod manifest;
pub mod resample;

pub use audio::{ConversionReport, LoadedSound, convert_file, load_sound, output_kind};
pub use convert::{ConvertRequest, Converted, Limits, OutputKind, convert};
pub use resample::{LinearResampler, Resample, ResamplerKind, SincResampler};
