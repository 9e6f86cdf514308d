//! ttspost - post-processing for synthesized speech
//!
//! Takes the raw waveform of a sequence-to-audio model, reverses its
//! pre-emphasis, trims the trailing silence and writes 16-bit PCM WAV.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod pipeline;
pub mod sequence;
pub mod synth;

// Model boundary
pub use synth::{MockEngine, SynthesisEngine, WaveformFileEngine};

// Pipeline
pub use pipeline::{Pipeline, PipelineConfig, PipelineError, PipelineState, Stage, SynthesisReport};

// Stages
pub use audio::{PcmBuffer, SilenceConfig, WaveformEncoder, find_end_point, inverse_preemphasis};
pub use sequence::TokenSequence;

// Error handling
pub use error::{Result, TtsPostError};

// Config
pub use config::{Config, HyperParameters};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
