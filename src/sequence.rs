//! Token sequence input.
//!
//! The external model consumes a sequence of symbol ids. The input file is a
//! JSON document whose `sequence` field holds the ids as a number array:
//!
//! ```json
//! {"sequence": [12, 44, 31, 1]}
//! ```
//!
//! Vocabulary range is the model's concern and is not checked here.

use crate::defaults;
use crate::error::{Result, TtsPostError};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;

/// Ordered, non-empty sequence of model symbol ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSequence(Vec<i32>);

impl TokenSequence {
    /// Load the default `sequence` field from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_field(path, defaults::SEQUENCE_FIELD)
    }

    /// Load a named number-array field from a JSON file.
    pub fn load_field(path: &Path, field: &str) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| TtsPostError::io(path, e))?;
        Self::parse(&contents, field, &path.display().to_string())
    }

    /// Parse a named number-array field from JSON text.
    pub fn from_json_str(text: &str, field: &str) -> Result<Self> {
        Self::parse(text, field, "sequence document")
    }

    fn parse(text: &str, field: &str, resource: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| TtsPostError::Parse {
            resource: resource.to_string(),
            message: e.to_string(),
        })?;
        Self::from_value(&value, field)
    }

    /// Extract a named number-array field from a parsed document.
    ///
    /// Each element is truncated toward zero and saturated to the `i32` range.
    pub fn from_value(value: &Value, field: &str) -> Result<Self> {
        let element = value
            .get(field)
            .ok_or_else(|| TtsPostError::MissingField {
                field: field.to_string(),
            })?;

        let items = element.as_array().ok_or_else(|| TtsPostError::TypeMismatch {
            field: field.to_string(),
            message: format!("expected an array, found {}", json_type_name(element)),
        })?;

        let tokens = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.as_f64()
                    .map(|number| number as i32)
                    .ok_or_else(|| TtsPostError::TypeMismatch {
                        field: field.to_string(),
                        message: format!(
                            "element {} is {}, not a number",
                            index,
                            json_type_name(item)
                        ),
                    })
            })
            .collect::<Result<Vec<i32>>>()?;

        Self::new(tokens)
    }

    /// Wrap already decoded ids. Empty input is rejected.
    pub fn new(tokens: Vec<i32>) -> Result<Self> {
        if tokens.is_empty() {
            return Err(TtsPostError::InvalidArgument {
                message: "token sequence must contain at least one element".to_string(),
            });
        }
        Ok(Self(tokens))
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for a sequence built through `new` or the loaders.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Per-batch length array the model expects alongside the ids (batch size 1).
    pub fn input_lengths(&self) -> [i32; 1] {
        [i32::try_from(self.0.len()).unwrap_or(i32::MAX)]
    }
}

impl fmt::Display for TokenSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", token)?;
        }
        write!(f, "]")
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
