//! Default configuration constants for ttspost.
//!
//! Shared by the configuration types and the processing stages so the
//! reference values live in one place.

/// Default output sample rate in Hz.
///
/// Matches the rate the reference Tacotron models are trained at.
pub const SAMPLE_RATE: u32 = 20000;

/// Default pre-emphasis coefficient used during training data preparation.
pub const PREEMPHASIS: f32 = 0.97;

/// Silence threshold in decibels relative to full scale.
pub const SILENCE_THRESHOLD_DB: f32 = -40.0;

/// Minimum sustained silence, in seconds, before the tail is dropped.
pub const MIN_SILENCE_SECS: f32 = 0.8;

/// Name of the JSON field holding the token sequence.
pub const SEQUENCE_FIELD: &str = "sequence";

/// Peak value a normalized waveform is scaled to.
pub const PCM_TARGET_PEAK: f32 = 32767.0;

/// Smallest peak used when computing the normalization factor.
///
/// Keeps near-silent input from blowing up the gain.
pub const PEAK_FLOOR: f32 = 0.01;

/// Upper bound of the unsigned 16-bit quantization range.
pub const PCM_MAX: f32 = 65535.0;

/// Bits per output sample.
pub const BITS_PER_SAMPLE: u16 = 16;

/// Default output file name.
pub const OUTPUT_FILE: &str = "output.wav";
