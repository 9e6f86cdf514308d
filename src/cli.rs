//! Command-line interface for ttspost
//!
//! Provides argument parsing using clap derive macros.

use crate::defaults;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Turn raw synthesized speech into a trimmed 16-bit WAV file
#[derive(Parser, Debug)]
#[command(
    name = "ttspost",
    version,
    about = "Turn raw synthesized speech into a trimmed 16-bit WAV file"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: stage summary, -vv: full diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Input token sequence (JSON with a "sequence" number array)
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Raw model output to post-process (WAV, float or integer samples)
    #[arg(short, long, value_name = "PATH")]
    pub waveform: Option<PathBuf>,

    /// Hyperparameters file (JSON); preemphasis defaults to 0.97
    #[arg(long, value_name = "PATH")]
    pub hparams: Option<PathBuf>,

    /// Output WAV file
    #[arg(short, long, value_name = "PATH", default_value = defaults::OUTPUT_FILE)]
    pub output: PathBuf,

    /// Output sample rate in Hz (overrides config and hyperparameters)
    #[arg(long, value_name = "HZ")]
    pub sample_rate: Option<u32>,

    /// Silence threshold in dB for end-point detection
    #[arg(long, value_name = "DB", allow_hyphen_values = true)]
    pub threshold_db: Option<f32>,

    /// Minimum silence duration in seconds before the tail is dropped
    #[arg(long, value_name = "SECONDS")]
    pub min_silence: Option<f32>,

    /// Keep the trailing silence
    #[arg(long)]
    pub no_trim: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}
