use crate::defaults;
use crate::error::{Result, TtsPostError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub trim: TrimConfig,
    pub sequence: SequenceConfig,
}

/// Output audio configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
}

/// End-point trimming configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrimConfig {
    pub enabled: bool,
    pub threshold_db: f32,
    pub min_silence_secs: f32,
}

/// Token sequence input configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SequenceConfig {
    pub field: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_db: defaults::SILENCE_THRESHOLD_DB,
            min_silence_secs: defaults::MIN_SILENCE_SECS,
        }
    }
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            field: defaults::SEQUENCE_FIELD.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| TtsPostError::io(path, e))?;
        Ok(toml::from_str(&contents)?)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - TTSPOST_SAMPLE_RATE → audio.sample_rate
    /// - TTSPOST_THRESHOLD_DB → trim.threshold_db
    /// - TTSPOST_MIN_SILENCE_SECS → trim.min_silence_secs
    ///
    /// Empty or unparsable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(rate) = env_value::<u32>("TTSPOST_SAMPLE_RATE") {
            self.audio.sample_rate = rate;
        }

        if let Some(db) = env_value::<f32>("TTSPOST_THRESHOLD_DB") {
            self.trim.threshold_db = db;
        }

        if let Some(secs) = env_value::<f32>("TTSPOST_MIN_SILENCE_SECS") {
            self.trim.min_silence_secs = secs;
        }

        self
    }

    /// Check values that deserialize fine but cannot drive the pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate == 0 {
            return Err(TtsPostError::ConfigInvalidValue {
                key: "audio.sample_rate".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if !self.trim.threshold_db.is_finite() {
            return Err(TtsPostError::ConfigInvalidValue {
                key: "trim.threshold_db".to_string(),
                message: "must be a finite number".to_string(),
            });
        }
        if !(self.trim.min_silence_secs.is_finite() && self.trim.min_silence_secs > 0.0) {
            return Err(TtsPostError::ConfigInvalidValue {
                key: "trim.min_silence_secs".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.sequence.field.is_empty() {
            return Err(TtsPostError::ConfigInvalidValue {
                key: "sequence.field".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/ttspost/config.toml on Linux, or a relative
    /// `ttspost/config.toml` when no config directory is known.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_default()
            .join("ttspost")
            .join("config.toml")
    }
}

fn env_value<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .and_then(|v| v.trim().parse().ok())
}

/// Hyperparameters shared with the model's training pipeline.
///
/// Read once per run and handed to the stages by value; there is no
/// process-wide copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HyperParameters {
    /// Pre-emphasis coefficient in (0, 1).
    pub preemphasis: f32,
    /// Sample rate the model was trained at, when the file names one.
    pub sample_rate: Option<u32>,
}

impl Default for HyperParameters {
    fn default() -> Self {
        Self {
            preemphasis: defaults::PREEMPHASIS,
            sample_rate: None,
        }
    }
}

impl HyperParameters {
    /// Load hyperparameters from a JSON file.
    ///
    /// The path must be readable; a missing `preemphasis` field is not an error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| TtsPostError::io(path, e))?;
        Self::parse(&contents, &path.display().to_string())
    }

    /// Parse hyperparameters from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::parse(text, "hyperparameters")
    }

    fn parse(text: &str, resource: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| TtsPostError::Parse {
            resource: resource.to_string(),
            message: e.to_string(),
        })?;
        Self::from_value(&value)
    }

    /// Extract hyperparameters from an already parsed JSON document.
    ///
    /// Absent or non-numeric `preemphasis` falls back to the default.
    pub fn from_value(value: &Value) -> Result<Self> {
        let mut hparams = Self::default();

        match value.get("preemphasis") {
            Some(v) => match v.as_f64() {
                Some(coefficient) => {
                    let coefficient = coefficient as f32;
                    if !(coefficient > 0.0 && coefficient < 1.0) {
                        return Err(TtsPostError::ConfigInvalidValue {
                            key: "preemphasis".to_string(),
                            message: format!("{} is outside (0, 1)", coefficient),
                        });
                    }
                    hparams.preemphasis = coefficient;
                }
                None => tracing::warn!(
                    "preemphasis is not numeric, using default {}",
                    defaults::PREEMPHASIS
                ),
            },
            None => tracing::debug!(
                "preemphasis not set, using default {}",
                defaults::PREEMPHASIS
            ),
        }

        if let Some(v) = value.get("sample_rate") {
            match v.as_f64() {
                Some(rate) if is_sample_rate(rate) => hparams.sample_rate = Some(rate as u32),
                Some(rate) => {
                    return Err(TtsPostError::ConfigInvalidValue {
                        key: "sample_rate".to_string(),
                        message: format!("{} is not a usable sample rate", rate),
                    });
                }
                None => tracing::warn!("sample_rate is not numeric, ignoring it"),
            }
        }

        Ok(hparams)
    }

    /// Load from an optional path; `None` yields defaults.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Positive whole number that fits a `u32`; integral floats such as 22050.0 count.
fn is_sample_rate(rate: f64) -> bool {
    rate > 0.0 && rate.fract() == 0.0 && rate <= f64::from(u32::MAX)
}
