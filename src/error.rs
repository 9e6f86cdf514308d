//! Error types for ttspost.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TtsPostError {
    // Input document errors
    #[error("Property not found: {field}")]
    MissingField { field: String },

    #[error("Type mismatch for {field}: {message}")]
    TypeMismatch { field: String, message: String },

    #[error("Failed to parse {resource}: {message}")]
    Parse { resource: String, message: String },

    // Signal processing errors
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Empty buffer: {message}")]
    EmptyBuffer { message: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Synthesis engine errors
    #[error("Synthesis failed: {message}")]
    Synthesis { message: String },

    // I/O errors naming the resource
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },
}

impl TtsPostError {
    /// Build an `Io` error for `path` from any displayable cause.
    pub fn io(path: impl AsRef<std::path::Path>, cause: impl std::fmt::Display) -> Self {
        TtsPostError::Io {
            path: path.as_ref().display().to_string(),
            message: cause.to_string(),
        }
    }

    /// Short name of the error kind, used in pipeline failure reports.
    pub fn kind(&self) -> &'static str {
        match self {
            TtsPostError::MissingField { .. } => "MissingField",
            TtsPostError::TypeMismatch { .. } => "TypeMismatch",
            TtsPostError::Parse { .. } => "Parse",
            TtsPostError::InvalidArgument { .. } => "InvalidArgument",
            TtsPostError::EmptyBuffer { .. } => "EmptyBuffer",
            TtsPostError::ConfigInvalidValue { .. } | TtsPostError::Config(_) => "Config",
            TtsPostError::Synthesis { .. } => "Synthesis",
            TtsPostError::Io { .. } => "IOError",
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, TtsPostError>;
