//! Engine that replays a waveform rendered ahead of time.
//!
//! Lets the post-processing run against model output captured elsewhere
//! (for example dumped from an inference server) without linking a backend.

use crate::audio::wav::RawWaveform;
use crate::error::{Result, TtsPostError};
use crate::synth::engine::{SynthesisEngine, check_lengths};
use std::path::Path;

/// Serves the samples of a WAV file as the synthesis result.
#[derive(Debug, Clone)]
pub struct WaveformFileEngine {
    name: String,
    waveform: RawWaveform,
}

impl WaveformFileEngine {
    /// Load the waveform file once; every request returns its samples.
    pub fn open(path: &Path) -> Result<Self> {
        let waveform = RawWaveform::load(path)?;
        if waveform.samples.is_empty() {
            tracing::warn!("waveform file {} holds no samples", path.display());
        }
        Ok(Self {
            name: file_label(path),
            waveform,
        })
    }

    /// Sample rate recorded in the file header.
    pub fn sample_rate(&self) -> u32 {
        self.waveform.sample_rate
    }

    pub fn len(&self) -> usize {
        self.waveform.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waveform.samples.is_empty()
    }
}

impl SynthesisEngine for WaveformFileEngine {
    fn synthesize(&self, tokens: &[i32], input_lengths: &[i32]) -> Result<Vec<f32>> {
        check_lengths(tokens, input_lengths).map_err(|e| TtsPostError::Synthesis {
            message: e.to_string(),
        })?;
        Ok(self.waveform.samples.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_float_wav(path: &Path, sample_rate: u32, samples: &[f32]) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn replays_file_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model_out.wav");
        write_float_wav(&path, 20000, &[0.1, -0.2, 0.3]);

        let engine = WaveformFileEngine::open(&path).unwrap();
        assert_eq!(engine.name(), "model_out.wav");
        assert_eq!(engine.sample_rate(), 20000);
        assert_eq!(engine.len(), 3);
        assert_eq!(engine.synthesize(&[1, 2], &[2]).unwrap(), vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn bad_lengths_are_synthesis_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model_out.wav");
        write_float_wav(&path, 20000, &[0.1]);

        let engine = WaveformFileEngine::open(&path).unwrap();
        assert!(matches!(
            engine.synthesize(&[1, 2], &[5]),
            Err(TtsPostError::Synthesis { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = WaveformFileEngine::open(Path::new("/tmp/nonexistent_ttspost_12345.wav"));
        assert!(matches!(result, Err(TtsPostError::Io { .. })));
    }
}
