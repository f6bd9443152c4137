//! CLI Module
//!
//! Command-line interface for Slowverb.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::error::Result;
use crate::params::{find_preset, EffectParameters};

/// Slowverb - slowed, sped up, pitched and reverbed versions of audio files
#[derive(Parser, Debug)]
#[command(name = "slowverb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Effect selection shared by commands
#[derive(Args, Debug, Clone, Default)]
pub struct EffectArgs {
    /// Start from a preset (see `slowverb presets`)
    #[arg(long)]
    pub preset: Option<String>,

    /// Tempo multiplier, 0.5 to 2.0
    #[arg(short, long)]
    pub tempo: Option<f64>,

    /// Pitch shift in semitones, -12 to 12
    #[arg(short, long, allow_negative_numbers = true)]
    pub pitch: Option<i32>,

    /// Reverb amount in percent, 0 to 100
    #[arg(short, long)]
    pub reverb: Option<u8>,
}

impl EffectArgs {
    /// Preset values (or the identity) overridden by explicit flags
    pub fn resolve(&self) -> Result<EffectParameters> {
        let base = match &self.preset {
            Some(id) => find_preset(id)?.params(),
            None => EffectParameters::default(),
        };

        EffectParameters::new(
            self.tempo.unwrap_or(base.tempo()),
            self.pitch.unwrap_or(base.pitch_semitones()),
            self.reverb.unwrap_or(base.reverb_percent()),
        )
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply effects to an audio file and write the result as MP3
    #[command(name = "process")]
    Process {
        /// Input audio file
        input: PathBuf,

        #[command(flatten)]
        effects: EffectArgs,

        /// Directory for the output file (default: next to the input)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// ffmpeg binary (overrides SLOWVERB_FFMPEG_PATH)
        #[arg(long)]
        ffmpeg: Option<PathBuf>,

        /// Give up if the engine runs longer than this (overrides SLOWVERB_EXECUTE_TIMEOUT_MS)
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Print the filter graph for a set of effects
    #[command(name = "graph")]
    Graph {
        #[command(flatten)]
        effects: EffectArgs,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List built-in presets
    #[command(name = "presets")]
    Presets {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}
