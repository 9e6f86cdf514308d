//! Data types for the synthesis pipeline.

use crate::pipeline::error::Stage;
use std::path::PathBuf;
use std::time::Duration;

/// Progress of one synthesis request.
///
/// Each successful stage moves one step to the right:
/// `Idle → SequenceLoaded → Synthesized → Deemphasized → Trimmed → Encoded → Done`.
/// Any failure moves to `Failed`, recording the stage that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    SequenceLoaded,
    Synthesized,
    Deemphasized,
    Trimmed,
    Encoded,
    Done,
    Failed(Stage),
}

impl PipelineState {
    /// Returns true for `Done` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed(_))
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisReport {
    /// Name of the engine that produced the waveform.
    pub engine: String,
    /// Number of input tokens.
    pub tokens: usize,
    /// Samples returned by the engine.
    pub raw_samples: usize,
    /// Detected end point; equals the number of samples written.
    pub end_point: usize,
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Peak absolute amplitude before normalization.
    pub peak: f32,
    /// Normalization factor applied.
    pub factor: f32,
    /// Wall time spent inside the engine call.
    pub synthesis_time: Duration,
    /// Destination WAV file.
    pub output: PathBuf,
}

impl SynthesisReport {
    /// Output duration in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.end_point as f32 / self.sample_rate as f32
    }

    /// Samples dropped as trailing silence.
    pub fn trimmed_samples(&self) -> usize {
        self.raw_samples - self.end_point
    }
}
