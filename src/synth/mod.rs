//! Boundary to the external sequence-to-audio model.

pub mod engine;
pub mod replay;

pub use engine::{MockEngine, SynthesisEngine};
pub use replay::WaveformFileEngine;
