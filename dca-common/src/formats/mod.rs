//! Dreamcast binary audio formats
//!
//! Only one container exists today: `.dca`, which stores headered,
//! DMA-aligned channel blocks ready to be copied into AICA sound RAM.

pub mod dca;

pub use dca::*;
