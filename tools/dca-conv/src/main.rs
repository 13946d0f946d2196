//! dcaconv - Dreamcast audio converter
//!
//! Converts WAV, FLAC, MP3 and Ogg Vorbis sounds to the AICA-ready `.dca`
//! format (or back to WAV)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use dca_common::{DCA_EXT, DEFAULT_LENGTH_MARGIN, DcaFormat, decode_dca};

// Use modules from library
use dca_conv::{ConvertRequest, Limits, OutputKind, ResamplerKind, audio, manifest};

#[derive(Parser)]
#[command(name = "dcaconv")]
#[command(about = "Dreamcast audio converter")]
#[command(version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    /// ADPCM for .dca, PCM16 for .wav
    Auto,
    Pcm16,
    Pcm8,
    Adpcm,
}

impl FormatArg {
    fn format(self) -> Option<DcaFormat> {
        match self {
            FormatArg::Auto => None,
            FormatArg::Pcm16 => Some(DcaFormat::Pcm16),
            FormatArg::Pcm8 => Some(DcaFormat::Pcm8),
            FormatArg::Adpcm => Some(DcaFormat::Adpcm),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single sound
    Convert {
        /// Input WAV/FLAC/MP3/OGG/DCA file
        input: PathBuf,

        /// Output .dca or .wav file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sample format
        #[arg(short, long, value_enum, default_value = "auto")]
        format: FormatArg,

        /// Output sample rate in Hz (default: source rate)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        rate: Option<u32>,

        /// Output channels (default: 1 for .dca, source count for .wav)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=8))]
        channels: Option<u8>,

        /// Keep two channels
        #[arg(long, conflicts_with = "channels")]
        stereo: bool,

        /// First sample of the loop
        #[arg(long)]
        loop_start: Option<u32>,

        /// End of the loop (exclusive)
        #[arg(long)]
        loop_end: Option<u32>,

        /// Allow sounds longer than the AICA can address
        #[arg(short, long)]
        long: bool,

        /// Trim leading and trailing silence below LEVEL (default 256)
        #[arg(short, long, value_name = "LEVEL", num_args = 0..=1, default_missing_value = "256")]
        trim: Option<i16>,

        /// Samples kept free below the AICA length limit
        #[arg(long, default_value_t = DEFAULT_LENGTH_MARGIN)]
        length_margin: usize,

        /// Resampling algorithm (sinc or linear)
        #[arg(long, default_value_t = ResamplerKind::Sinc)]
        resampler: ResamplerKind,

        /// Also write the .dca decoded back to this WAV file
        #[arg(short, long)]
        preview: Option<PathBuf>,
    },

    /// Build sounds from a manifest file
    Build {
        /// Path to sounds.toml manifest
        #[arg(default_value = "sounds.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate manifest without building
    Check {
        /// Path to sounds.toml manifest
        #[arg(default_value = "sounds.toml")]
        manifest: PathBuf,
    },

    /// Show the header of a .dca file
    Info {
        /// Input .dca file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match cli.command {
        Commands::Convert {
            input,
            output,
            format,
            rate,
            channels,
            stereo,
            loop_start,
            loop_end,
            long,
            trim,
            length_margin,
            resampler,
            preview,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(DCA_EXT));
            if output == input {
                anyhow::bail!("Output {:?} would overwrite the input", output);
            }
            tracing::info!("Converting {:?} -> {:?}", input, output);

            let channels = if stereo {
                2
            } else {
                channels.map_or(0, usize::from)
            };

            let request = ConvertRequest {
                format: format.format(),
                channels,
                sample_rate_hz: rate.unwrap_or(0),
                allow_long: long,
                loop_start,
                loop_end,
                trim_threshold: trim,
                limits: Limits::with_length_margin(length_margin),
                ..ConvertRequest::new(OutputKind::Dca)
            };

            let resampler = resampler.build();
            audio::convert_file(&input, &output, &request, resampler.as_ref(), preview.as_deref())
                .with_context(|| format!("Failed to convert {:?}", input))?;
            tracing::info!("Done!");
        }

        Commands::Build { manifest, output } => {
            tracing::info!("Building sounds from {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::build_all(&config, output.as_deref())?;
            tracing::info!("Build complete!");
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Info { input } => {
            let data =
                std::fs::read(&input).with_context(|| format!("Failed to read {:?}", input))?;
            let file = decode_dca(&data).with_context(|| format!("Failed to decode {:?}", input))?;
            let header = &file.header;

            println!("{}", input.display());
            println!("  format:      {}", file.format());
            println!("  channels:    {}", header.channel_count());
            println!(
                "  sample rate: {:.2} Hz (pitch code 0x{:04x})",
                header.sample_rate_hz(),
                header.sample_rate_code
            );
            println!(
                "  length:      {} samples ({:.3} s)",
                header.length,
                file.buffer.duration_secs()
            );
            match file.loop_points() {
                Some((start, end)) => println!("  loop:        {}..{}", start, end),
                None => println!("  loop:        none"),
            }
            println!("  long:        {}", header.is_long());
            println!("  size:        {} bytes", header.chunk_size);
        }
    }

    Ok(())
}
