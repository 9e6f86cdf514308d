//! Synthesis pipeline: sequence → model → de-emphasis → trim → WAV.
//!
//! Every stage consumes the complete output of the previous one; nothing is
//! streamed. The pipeline stops at the first failing stage and reports it.

use crate::audio::deemphasis::{deemphasis_scale, inverse_preemphasis};
use crate::audio::silence::{SilenceConfig, find_end_point};
use crate::audio::wav::{PcmBuffer, WaveformEncoder};
use crate::config::{Config, HyperParameters};
use crate::defaults;
use crate::error::Result;
use crate::pipeline::error::{ErrorReporter, LogReporter, PipelineError, Stage};
use crate::pipeline::types::{PipelineState, SynthesisReport};
use crate::sequence::TokenSequence;
use crate::synth::engine::SynthesisEngine;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Configuration for the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Output sample rate
    pub sample_rate: u32,
    /// Hyperparameters shared with the model's training setup
    pub hparams: HyperParameters,
    /// Drop the trailing silence after the detected end point
    pub trim: bool,
    /// End-point detection parameters
    pub silence: SilenceConfig,
    /// JSON field holding the token sequence
    pub sequence_field: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            hparams: HyperParameters::default(),
            trim: true,
            silence: SilenceConfig::default(),
            sequence_field: defaults::SEQUENCE_FIELD.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Combine file configuration with hyperparameters.
    ///
    /// A sample rate named by the hyperparameters wins over `audio.sample_rate`,
    /// since it describes what the model actually produces.
    pub fn from_config(config: &Config, hparams: HyperParameters) -> Self {
        Self {
            sample_rate: hparams.sample_rate.unwrap_or(config.audio.sample_rate),
            hparams,
            trim: config.trim.enabled,
            silence: SilenceConfig {
                threshold_db: config.trim.threshold_db,
                min_silence_secs: config.trim.min_silence_secs,
            },
            sequence_field: config.sequence.field.clone(),
        }
    }
}

/// Single-request synthesis pipeline.
///
/// Owns its engine and buffers; run separate instances for concurrent requests.
pub struct Pipeline<E: SynthesisEngine> {
    config: PipelineConfig,
    engine: E,
    state: PipelineState,
    error_reporter: Arc<dyn ErrorReporter>,
}

impl<E: SynthesisEngine> Pipeline<E> {
    /// Creates a new pipeline in the `Idle` state.
    pub fn new(config: PipelineConfig, engine: E) -> Self {
        Self {
            config,
            engine,
            state: PipelineState::Idle,
            error_reporter: Arc::new(LogReporter),
        }
    }

    /// Sets a custom error reporter.
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = reporter;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Current state of the last (or running) request.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run a full request: read tokens from `input`, write the WAV to `output`.
    pub fn run(
        &mut self,
        input: &Path,
        output: &Path,
    ) -> std::result::Result<SynthesisReport, PipelineError> {
        let _span = tracing::info_span!("pipeline", engine = self.engine.name()).entered();
        self.state = PipelineState::Idle;

        let loaded = TokenSequence::load_field(input, &self.config.sequence_field);
        let tokens = self.complete(Stage::LoadSequence, loaded)?;
        tracing::debug!(tokens = tokens.len(), "loaded sequence from {}", input.display());

        self.run_loaded(&tokens, output)
    }

    /// Run a request for an already loaded token sequence.
    pub fn run_tokens(
        &mut self,
        tokens: &TokenSequence,
        output: &Path,
    ) -> std::result::Result<SynthesisReport, PipelineError> {
        let _span = tracing::info_span!("pipeline", engine = self.engine.name()).entered();
        self.state = PipelineState::SequenceLoaded;
        self.run_loaded(tokens, output)
    }

    fn run_loaded(
        &mut self,
        tokens: &TokenSequence,
        output: &Path,
    ) -> std::result::Result<SynthesisReport, PipelineError> {
        let (waveform, synthesis_time) = self.timed_synthesis(tokens)?;
        let raw_samples = waveform.len();

        let pcm = self.postprocess(waveform)?;

        let written = pcm.write_wav(output);
        self.complete(Stage::Write, written)?;

        let report = SynthesisReport {
            engine: self.engine.name().to_string(),
            tokens: tokens.len(),
            raw_samples,
            end_point: pcm.len(),
            sample_rate: pcm.sample_rate(),
            peak: pcm.peak(),
            factor: pcm.factor(),
            synthesis_time,
            output: output.to_path_buf(),
        };
        tracing::info!(
            samples = report.end_point,
            trimmed = report.trimmed_samples(),
            synth_ms = report.synthesis_time.as_millis() as u64,
            "wrote {:.2}s of audio to {}",
            report.duration_secs(),
            output.display()
        );
        Ok(report)
    }

    /// Call the engine with the sequence and its single-element length array.
    pub fn synthesize(
        &mut self,
        tokens: &TokenSequence,
    ) -> std::result::Result<Vec<f32>, PipelineError> {
        self.timed_synthesis(tokens).map(|(waveform, _)| waveform)
    }

    fn timed_synthesis(
        &mut self,
        tokens: &TokenSequence,
    ) -> std::result::Result<(Vec<f32>, Duration), PipelineError> {
        let start = Instant::now();
        let synthesized = self
            .engine
            .synthesize(tokens.as_slice(), &tokens.input_lengths());
        let elapsed = start.elapsed();
        let waveform = self.complete(Stage::Synthesize, synthesized)?;
        tracing::debug!(
            samples = waveform.len(),
            synth_ms = elapsed.as_millis() as u64,
            "engine returned waveform"
        );
        Ok((waveform, elapsed))
    }

    /// De-emphasize, trim and quantize a raw model waveform.
    pub fn postprocess(
        &mut self,
        waveform: Vec<f32>,
    ) -> std::result::Result<PcmBuffer, PipelineError> {
        let scale = deemphasis_scale(&self.config.hparams);
        let deemphasized = inverse_preemphasis(&waveform, scale);
        drop(waveform);
        let mut samples = self.complete(Stage::Deemphasize, deemphasized)?;
        tracing::debug!(scale, "de-emphasized waveform");

        let end_point = if self.config.trim {
            find_end_point(&samples, self.config.sample_rate, &self.config.silence)
        } else {
            samples.len()
        };
        tracing::debug!(end_point, total = samples.len(), "end point detected");
        samples.truncate(end_point);
        self.complete(Stage::Trim, Ok(()))?;

        let encoded = WaveformEncoder::new(self.config.sample_rate).encode(&samples);
        let pcm = self.complete(Stage::Encode, encoded)?;
        tracing::debug!(peak = pcm.peak(), factor = pcm.factor(), "normalized waveform");
        Ok(pcm)
    }

    /// Record the outcome of `stage`: advance on success, fail and report otherwise.
    fn complete<T>(
        &mut self,
        stage: Stage,
        result: Result<T>,
    ) -> std::result::Result<T, PipelineError> {
        match result {
            Ok(value) => {
                self.state = stage.completed_state();
                Ok(value)
            }
            Err(source) => {
                self.state = PipelineState::Failed(stage);
                let error = PipelineError::new(stage, source);
                self.error_reporter.report(&error);
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::deemphasis::apply_preemphasis;
    use crate::error::TtsPostError;
    use crate::synth::engine::{MockEngine, check_lengths};
    use std::io::Write;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CollectingReporter {
        reports: Mutex<Vec<(Stage, &'static str)>>,
    }

    impl ErrorReporter for CollectingReporter {
        fn report(&self, error: &PipelineError) {
            self.reports
                .lock()
                .unwrap()
                .push((error.stage, error.kind()));
        }
    }

    /// Engine that takes a fixed amount of wall time per call.
    struct SlowEngine {
        delay: Duration,
    }

    impl SynthesisEngine for SlowEngine {
        fn synthesize(&self, tokens: &[i32], input_lengths: &[i32]) -> Result<Vec<f32>> {
            check_lengths(tokens, input_lengths)?;
            std::thread::sleep(self.delay);
            let mut waveform = vec![0.0f32; 200];
            waveform[0] = 0.5;
            Ok(waveform)
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    fn test_config() -> PipelineConfig {
        PipelineConfig {
            sample_rate: 80,
            silence: SilenceConfig {
                threshold_db: -40.0,
                min_silence_secs: 0.5,
            },
            ..Default::default()
        }
    }

    fn write_sequence(dir: &Path, contents: &str) -> std::path::PathBuf {
        let path = dir.join("sequence.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.sample_rate, 20000);
        assert_eq!(config.hparams.preemphasis, 0.97);
        assert!(config.trim);
        assert_eq!(config.silence, SilenceConfig::default());
        assert_eq!(config.sequence_field, "sequence");
    }

    #[test]
    fn test_config_from_file_config() {
        let mut file_config = Config::default();
        file_config.audio.sample_rate = 16000;
        file_config.trim.enabled = false;
        file_config.trim.threshold_db = -30.0;

        let config = PipelineConfig::from_config(&file_config, HyperParameters::default());
        assert_eq!(config.sample_rate, 16000);
        assert!(!config.trim);
        assert_eq!(config.silence.threshold_db, -30.0);

        let hparams = HyperParameters {
            preemphasis: 0.9,
            sample_rate: Some(22050),
        };
        let config = PipelineConfig::from_config(&file_config, hparams);
        assert_eq!(config.sample_rate, 22050);
        assert_eq!(config.hparams.preemphasis, 0.9);
    }

    #[test]
    fn test_new_pipeline_is_idle() {
        let pipeline = Pipeline::new(PipelineConfig::default(), MockEngine::new("m", vec![]));
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert_eq!(pipeline.engine().name(), "m");
    }

    #[test]
    fn test_postprocess_trims_and_encodes() {
        // 120 loud samples then 80 silent ones after de-emphasis.
        let mut target: Vec<f32> = (0..120)
            .map(|i| if i % 2 == 0 { 0.8 } else { -0.8 })
            .collect();
        target.extend(std::iter::repeat_n(0.0, 80));
        let config = test_config();
        let raw = apply_preemphasis(&target, deemphasis_scale(&config.hparams));
        let mut pipeline = Pipeline::new(config, MockEngine::new("m", vec![]));

        let pcm = pipeline.postprocess(raw).unwrap();
        assert_eq!(pipeline.state(), PipelineState::Encoded);
        // First silent window starts at 120, end point is one 10-sample hop later.
        assert_eq!(pcm.len(), 130);
        assert_eq!(pcm.sample_rate(), 80);
        assert_eq!(pcm.samples()[0], 32767);
        assert_eq!(pcm.samples()[1], 0);
    }

    #[test]
    fn test_postprocess_without_trim_keeps_everything() {
        let mut config = test_config();
        config.trim = false;
        let mut pipeline = Pipeline::new(config, MockEngine::new("m", vec![]));

        let mut raw = vec![0.0f32; 400];
        raw[0] = 1.0;
        let pcm = pipeline.postprocess(raw).unwrap();
        assert_eq!(pcm.len(), 400);
    }

    #[test]
    fn test_empty_waveform_fails_at_deemphasis() {
        let reporter = Arc::new(CollectingReporter::default());
        let mut pipeline = Pipeline::new(test_config(), MockEngine::new("m", vec![]))
            .with_error_reporter(reporter.clone());

        let error = pipeline.postprocess(Vec::new()).unwrap_err();
        assert_eq!(error.stage, Stage::Deemphasize);
        assert!(matches!(error.source, TtsPostError::InvalidArgument { .. }));
        assert_eq!(pipeline.state(), PipelineState::Failed(Stage::Deemphasize));
        assert_eq!(
            *reporter.reports.lock().unwrap(),
            vec![(Stage::Deemphasize, "InvalidArgument")]
        );
    }

    #[test]
    fn test_run_writes_wav_and_reaches_done() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_sequence(dir.path(), r#"{"sequence":[3,1,4,1,5]}"#);
        let output = dir.path().join("out.wav");

        let mut waveform = vec![0.0f32; 400];
        waveform[0] = 0.5;
        let mut pipeline = Pipeline::new(test_config(), MockEngine::new("mock", waveform));

        let report = pipeline.run(&input, &output).unwrap();
        assert_eq!(pipeline.state(), PipelineState::Done);
        assert_eq!(report.tokens, 5);
        assert_eq!(report.raw_samples, 400);
        assert!(report.end_point < 400);
        assert_eq!(report.engine, "mock");

        let reader = hound::WavReader::open(&output).unwrap();
        assert_eq!(reader.len() as usize, report.end_point);
        assert_eq!(reader.spec().sample_rate, 80);
    }

    #[test]
    fn test_run_missing_field_fails_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_sequence(dir.path(), r#"{"other":[1]}"#);
        let output = dir.path().join("out.wav");
        let mut pipeline = Pipeline::new(test_config(), MockEngine::new("m", vec![0.1]));

        let error = pipeline.run(&input, &output).unwrap_err();
        assert_eq!(error.stage, Stage::LoadSequence);
        assert_eq!(error.kind(), "MissingField");
        assert_eq!(pipeline.state(), PipelineState::Failed(Stage::LoadSequence));
        assert!(!output.exists());
    }

    #[test]
    fn test_run_engine_failure_fails_at_synthesize() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_sequence(dir.path(), r#"{"sequence":[1]}"#);
        let output = dir.path().join("out.wav");
        let mut pipeline = Pipeline::new(
            test_config(),
            MockEngine::new("m", vec![0.1]).with_failure(),
        );

        let error = pipeline.run(&input, &output).unwrap_err();
        assert_eq!(error.stage, Stage::Synthesize);
        assert_eq!(error.kind(), "Synthesis");
    }

    #[test]
    fn test_run_unwritable_output_fails_at_write() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_sequence(dir.path(), r#"{"sequence":[1]}"#);
        let output = dir.path().join("missing_dir").join("out.wav");
        let mut pipeline = Pipeline::new(test_config(), MockEngine::new("m", vec![0.1; 10]));

        let error = pipeline.run(&input, &output).unwrap_err();
        assert_eq!(error.stage, Stage::Write);
        assert_eq!(error.kind(), "IOError");
        assert!(error.source.to_string().contains("out.wav"));
        assert_eq!(pipeline.state(), PipelineState::Failed(Stage::Write));
    }

    #[test]
    fn test_run_tokens_skips_loading() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.wav");
        let tokens = TokenSequence::new(vec![1, 2]).unwrap();
        let mut pipeline = Pipeline::new(test_config(), MockEngine::new("m", vec![0.2; 20]));

        let report = pipeline.run_tokens(&tokens, &output).unwrap();
        assert_eq!(report.tokens, 2);
        assert_eq!(pipeline.state(), PipelineState::Done);
    }

    #[test]
    fn test_report_records_synthesis_time() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.wav");
        let tokens = TokenSequence::new(vec![9, 8, 7]).unwrap();
        let engine = SlowEngine {
            delay: Duration::from_millis(25),
        };
        let mut pipeline = Pipeline::new(test_config(), engine);

        let report = pipeline.run_tokens(&tokens, &output).unwrap();
        assert_eq!(report.engine, "slow");
        assert!(
            report.synthesis_time >= Duration::from_millis(25),
            "synthesis_time {:?}",
            report.synthesis_time
        );
        assert!(report.synthesis_time < Duration::from_secs(10));
    }

    #[test]
    fn test_failed_pipeline_can_run_again() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write_sequence(dir.path(), r#"{"sequence":"x"}"#);
        let output = dir.path().join("out.wav");
        let mut pipeline = Pipeline::new(test_config(), MockEngine::new("m", vec![0.1; 10]));

        assert!(pipeline.run(&bad, &output).is_err());

        let good = dir.path().join("good.json");
        std::fs::write(&good, r#"{"sequence":[1]}"#).unwrap();
        assert!(pipeline.run(&good, &output).is_ok());
        assert_eq!(pipeline.state(), PipelineState::Done);
    }
}
