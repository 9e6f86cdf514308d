use crate::error::{Result, TtsPostError};
use std::sync::Arc;

/// Trait for the sequence-to-audio model.
///
/// This trait allows swapping implementations (an inference backend, a
/// recorded waveform, or a mock).
pub trait SynthesisEngine: Send + Sync {
    /// Synthesize a waveform from model symbol ids.
    ///
    /// # Arguments
    /// * `tokens` - Symbol ids, batch size 1
    /// * `input_lengths` - Length of each sequence in the batch (`[tokens.len()]`)
    ///
    /// # Returns
    /// Mono float samples of unspecified length and scale
    fn synthesize(&self, tokens: &[i32], input_lengths: &[i32]) -> Result<Vec<f32>>;

    /// Get the name of the engine or loaded model
    fn name(&self) -> &str;
}

/// Implement SynthesisEngine for Arc<T> so one loaded model can serve several pipelines.
impl<T: SynthesisEngine> SynthesisEngine for Arc<T> {
    fn synthesize(&self, tokens: &[i32], input_lengths: &[i32]) -> Result<Vec<f32>> {
        (**self).synthesize(tokens, input_lengths)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Mock engine for testing
#[derive(Debug, Clone)]
pub struct MockEngine {
    name: String,
    waveform: Vec<f32>,
    should_fail: bool,
}

impl MockEngine {
    /// Create a mock engine that returns `waveform` for every request
    pub fn new(name: &str, waveform: Vec<f32>) -> Self {
        Self {
            name: name.to_string(),
            waveform,
            should_fail: false,
        }
    }

    /// Configure the mock to fail on synthesize
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl SynthesisEngine for MockEngine {
    fn synthesize(&self, tokens: &[i32], input_lengths: &[i32]) -> Result<Vec<f32>> {
        if self.should_fail {
            return Err(TtsPostError::Synthesis {
                message: "mock synthesis failure".to_string(),
            });
        }
        check_lengths(tokens, input_lengths)?;
        Ok(self.waveform.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Verify the batch-of-one length array matches the token count.
pub fn check_lengths(tokens: &[i32], input_lengths: &[i32]) -> Result<()> {
    match input_lengths {
        [length] if usize::try_from(*length).ok() == Some(tokens.len()) => Ok(()),
        _ => Err(TtsPostError::InvalidArgument {
            message: format!(
                "input lengths {:?} do not describe a single sequence of {} tokens",
                input_lengths,
                tokens.len()
            ),
        }),
    }
}
