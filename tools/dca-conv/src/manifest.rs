//! Manifest parsing and build orchestration
//!
//! Parses sounds.toml and converts every sound it lists.
//!
//! ```toml
//! [output]
//! dir = "build/sounds"
//!
//! [defaults]
//! format = "adpcm"
//! rate = 22050
//!
//! [sounds]
//! jump = "raw/jump.wav"
//! music = { path = "raw/music.ogg", long = true, loop_start = 4410 }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dca_common::{DCA_EXT, DEFAULT_LENGTH_MARGIN, DcaFormat};

use crate::audio;
use crate::convert::{ConvertRequest, Limits, OutputKind};
use crate::resample::ResamplerKind;

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub defaults: SoundSettings,
    #[serde(default)]
    pub sounds: BTreeMap<String, SoundEntry>,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("build/")
}

/// Conversion settings shared by `[defaults]` and per-sound tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SoundSettings {
    pub format: Option<DcaFormat>,
    pub rate: Option<u32>,
    pub channels: Option<usize>,
    pub long: Option<bool>,
    /// Silence threshold; trimming is off when unset
    pub trim: Option<i16>,
    pub length_margin: Option<usize>,
    pub resampler: Option<ResamplerKind>,
    pub loop_start: Option<u32>,
    pub loop_end: Option<u32>,
}

impl SoundSettings {
    /// `self` with unset fields taken from `defaults`
    pub fn or(&self, defaults: &SoundSettings) -> SoundSettings {
        SoundSettings {
            format: self.format.or(defaults.format),
            rate: self.rate.or(defaults.rate),
            channels: self.channels.or(defaults.channels),
            long: self.long.or(defaults.long),
            trim: self.trim.or(defaults.trim),
            length_margin: self.length_margin.or(defaults.length_margin),
            resampler: self.resampler.or(defaults.resampler),
            loop_start: self.loop_start.or(defaults.loop_start),
            loop_end: self.loop_end.or(defaults.loop_end),
        }
    }

    pub fn to_request(&self) -> ConvertRequest {
        ConvertRequest {
            format: self.format,
            channels: self.channels.unwrap_or(0),
            sample_rate_hz: self.rate.unwrap_or(0),
            allow_long: self.long.unwrap_or(false),
            loop_start: self.loop_start,
            loop_end: self.loop_end,
            trim_threshold: self.trim,
            limits: Limits::with_length_margin(self.length_margin.unwrap_or(DEFAULT_LENGTH_MARGIN)),
            ..ConvertRequest::new(OutputKind::Dca)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DetailedSound {
    pub path: PathBuf,
    #[serde(flatten)]
    pub settings: SoundSettings,
    /// Keys that are not settings; must stay empty
    #[serde(flatten)]
    pub unknown: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SoundEntry {
    Simple(PathBuf),
    Detailed(DetailedSound),
}

impl SoundEntry {
    pub fn path(&self) -> &Path {
        match self {
            SoundEntry::Simple(p) => p,
            SoundEntry::Detailed(sound) => &sound.path,
        }
    }

    /// Settings for this sound with the manifest defaults filled in
    pub fn settings(&self, defaults: &SoundSettings) -> SoundSettings {
        match self {
            SoundEntry::Simple(_) => defaults.clone(),
            SoundEntry::Detailed(sound) => sound.settings.or(defaults),
        }
    }
}

/// Parse manifest text, rejecting unknown per-sound keys
pub fn parse_manifest(content: &str) -> Result<Manifest> {
    let manifest: Manifest = toml::from_str(content)?;
    for (name, entry) in &manifest.sounds {
        if let SoundEntry::Detailed(sound) = entry
            && let Some(key) = sound.unknown.keys().next()
        {
            anyhow::bail!("Sound '{}' has an unknown setting '{}'", name, key);
        }
    }
    Ok(manifest)
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let mut manifest = parse_manifest(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;

    // Sound paths are relative to the manifest
    if let Some(base) = path.parent() {
        for entry in manifest.sounds.values_mut() {
            let resolved = base.join(entry.path());
            match entry {
                SoundEntry::Simple(p) => *p = resolved,
                SoundEntry::Detailed(sound) => sound.path = resolved,
            }
        }
        if manifest.output.dir.is_relative() {
            manifest.output.dir = base.join(&manifest.output.dir);
        }
    }

    Ok(manifest)
}

/// Validate a manifest without building
pub fn validate(manifest: &Manifest) -> Result<()> {
    for (name, entry) in &manifest.sounds {
        if !entry.path().exists() {
            anyhow::bail!("Sound '{}' source not found: {:?}", name, entry.path());
        }
        audio::InputKind::from_path(entry.path())
            .with_context(|| format!("Sound '{}' has an unsupported source", name))?;

        let settings = entry.settings(&manifest.defaults);
        if let Some(channels) = settings.channels
            && !(1..=dca_common::MAX_CHANNELS).contains(&channels)
        {
            anyhow::bail!("Sound '{}' has an invalid channel count: {}", name, channels);
        }
        if let (Some(start), Some(end)) = (settings.loop_start, settings.loop_end)
            && start >= end
        {
            anyhow::bail!("Sound '{}' loop start {} is not before loop end {}", name, start, end);
        }
    }
    Ok(())
}

/// Build all sounds from a manifest
pub fn build_all(manifest: &Manifest, output_override: Option<&Path>) -> Result<()> {
    let output_dir = output_override.unwrap_or(&manifest.output.dir);
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    for (name, entry) in &manifest.sounds {
        let output = output_dir.join(format!("{}.{}", name, DCA_EXT));
        tracing::info!("Converting sound: {} -> {:?}", name, output);

        let settings = entry.settings(&manifest.defaults);
        let resampler = settings.resampler.unwrap_or_default().build();
        audio::convert_file(
            entry.path(),
            &output,
            &settings.to_request(),
            resampler.as_ref(),
            None,
        )
        .with_context(|| format!("Failed to convert sound '{}'", name))?;
    }

    tracing::info!("Built {} sounds into {:?}", manifest.sounds.len(), output_dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let manifest = parse_manifest(
            r#"
            [output]
            dir = "out"

            [defaults]
            format = "pcm8"
            rate = 22050
            trim = 128

            [sounds]
            jump = "jump.wav"
            music = { path = "music.ogg", long = true, loop_start = 100, format = "adpcm" }
            "#,
        )
        .unwrap();

        assert_eq!(manifest.output.dir, PathBuf::from("out"));
        assert_eq!(manifest.sounds.len(), 2);

        let jump = manifest.sounds["jump"].settings(&manifest.defaults);
        assert_eq!(jump.format, Some(DcaFormat::Pcm8));
        assert_eq!(jump.rate, Some(22050));
        assert_eq!(jump.long, None);

        let music = &manifest.sounds["music"];
        assert_eq!(music.path(), Path::new("music.ogg"));
        let settings = music.settings(&manifest.defaults);
        assert_eq!(settings.format, Some(DcaFormat::Adpcm));
        assert_eq!(settings.rate, Some(22050));
        assert_eq!(settings.trim, Some(128));
        assert_eq!(settings.long, Some(true));
        assert_eq!(settings.loop_start, Some(100));
    }

    #[test]
    fn test_empty_manifest_defaults() {
        let manifest = parse_manifest("").unwrap();
        assert_eq!(manifest.output.dir, PathBuf::from("build/"));
        assert!(manifest.sounds.is_empty());
        assert_eq!(manifest.defaults, SoundSettings::default());
    }

    #[test]
    fn test_settings_to_request() {
        let settings = SoundSettings {
            format: Some(DcaFormat::Pcm16),
            rate: Some(11025),
            long: Some(true),
            length_margin: Some(0),
            ..SoundSettings::default()
        };
        let request = settings.to_request();
        assert_eq!(request.output, OutputKind::Dca);
        assert_eq!(request.format, Some(DcaFormat::Pcm16));
        assert_eq!(request.sample_rate_hz, 11025);
        assert_eq!(request.channels, 0);
        assert!(request.allow_long);
        assert_eq!(request.limits.max_samples, dca_common::AICA_MAX_SAMPLES);

        let request = SoundSettings::default().to_request();
        assert_eq!(request.limits, Limits::default());
        assert_eq!(request.trim_threshold, None);
    }

    #[test]
    fn test_unknown_setting_rejected() {
        assert!(parse_manifest("[defaults]\nvolume = 2\n").is_err());

        let err = parse_manifest("[sounds]\nmusic = { path = \"m.ogg\", loop_strat = 100 }\n")
            .unwrap_err();
        assert!(err.to_string().contains("loop_strat"), "{}", err);

        let manifest =
            parse_manifest("[sounds]\nmusic = { path = \"m.ogg\", loop_start = 100 }\n").unwrap();
        let settings = manifest.sounds["music"].settings(&manifest.defaults);
        assert_eq!(settings.loop_start, Some(100));
    }
}
