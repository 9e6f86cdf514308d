//! Synthesis pipeline.
//!
//! Runs the stages strictly in sequence on one thread, each stage consuming
//! the previous stage's complete buffer.

pub mod error;
pub mod orchestrator;
pub mod types;

pub use error::{ErrorReporter, LogReporter, PipelineError, Stage};
pub use orchestrator::{Pipeline, PipelineConfig};
pub use types::{PipelineState, SynthesisReport};
