//! Stage-tagged errors and reporting for the synthesis pipeline.

use crate::error::TtsPostError;
use crate::pipeline::types::PipelineState;
use std::fmt;
use thiserror::Error;

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadSequence,
    Synthesize,
    Deemphasize,
    Trim,
    Encode,
    Write,
}

impl Stage {
    /// State the pipeline enters once this stage succeeds.
    pub fn completed_state(self) -> PipelineState {
        match self {
            Stage::LoadSequence => PipelineState::SequenceLoaded,
            Stage::Synthesize => PipelineState::Synthesized,
            Stage::Deemphasize => PipelineState::Deemphasized,
            Stage::Trim => PipelineState::Trimmed,
            Stage::Encode => PipelineState::Encoded,
            Stage::Write => PipelineState::Done,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::LoadSequence => "load-sequence",
            Stage::Synthesize => "synthesize",
            Stage::Deemphasize => "deemphasize",
            Stage::Trim => "trim",
            Stage::Encode => "encode",
            Stage::Write => "write",
        };
        f.write_str(name)
    }
}

/// A stage failure: which stage, and why.
///
/// The message names the stage and error kind; the cause is the error source.
#[derive(Error, Debug)]
#[error("{stage} stage failed ({kind})", kind = .source.kind())]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: TtsPostError,
}

impl PipelineError {
    pub fn new(stage: Stage, source: TtsPostError) -> Self {
        Self { stage, source }
    }

    /// Error kind of the underlying failure.
    pub fn kind(&self) -> &'static str {
        self.source.kind()
    }
}

/// Trait for reporting pipeline failures.
pub trait ErrorReporter: Send + Sync {
    /// Reports a failed stage.
    fn report(&self, error: &PipelineError);
}

/// Reporter that logs failures through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, error: &PipelineError) {
        tracing::error!(stage = %error.stage, kind = error.kind(), "{}", error.source);
    }
}
