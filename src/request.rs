//! Invocation payload validation and target format resolution.

use crate::error::ParameterError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use tracing::info;

/// A resolved, non-empty conversion target as handed to the engine.
///
/// LibreOffice accepts `ext[:filter[:options]]`, so the token is kept
/// verbatim for the command line while [`TargetFormat::extension`] gives the
/// suffix of the file the engine writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TargetFormat(String);

impl TargetFormat {
    pub fn new(token: impl Into<String>) -> Result<Self, ParameterError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ParameterError::Empty { field: "convert_to" });
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn extension(&self) -> &str {
        self.0.split(':').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionRequest {
    pub input_bucket: String,
    pub input_path: String,
    pub output_bucket: String,
    pub output_path: String,
    pub convert_to: TargetFormat,
    /// True when `convert_to` came from `output_path` rather than the payload.
    pub format_inferred: bool,
    pub num_attempts: u32,
}

impl ConversionRequest {
    /// Validates a raw payload. Never touches storage or the engine.
    pub fn resolve(raw: &Value, default_attempts: u32) -> Result<Self, ParameterError> {
        let map = raw.as_object().ok_or(ParameterError::NotAnObject)?;

        let input_bucket = required_str(map, "input_bucket")?;
        let input_path = required_str(map, "input_path")?;
        let output_bucket = required_str(map, "output_bucket")?;
        let output_path = required_str(map, "output_path")?;

        if file_name(&input_path).is_none() {
            return Err(ParameterError::NoFileName { input_path });
        }

        let (convert_to, format_inferred) = match optional(map, "convert_to") {
            Some(Value::String(token)) => (TargetFormat::new(token.clone())?, false),
            Some(_) => {
                return Err(ParameterError::InvalidType {
                    field: "convert_to",
                    expected: "a string",
                });
            }
            None => {
                let ext = infer_extension(&output_path).ok_or_else(|| {
                    ParameterError::UninferableFormat {
                        output_path: output_path.clone(),
                    }
                })?;
                info!(
                    "convert_to not specified. Inferring type \"{ext}\" from output_path \"{output_path}\"."
                );
                (TargetFormat::new(ext)?, true)
            }
        };

        let num_attempts = match optional(map, "num_attempts") {
            Some(value) => parse_attempts(value)?,
            None => default_attempts,
        };

        Ok(Self {
            input_bucket,
            input_path,
            output_bucket,
            output_path,
            convert_to,
            format_inferred,
            num_attempts,
        })
    }

    /// Final segment of `input_path`; the name the source is staged under.
    pub fn input_file_name(&self) -> &str {
        file_name(&self.input_path).unwrap_or(&self.input_path)
    }
}

fn optional<'a>(map: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    map.get(field).filter(|v| !v.is_null())
}

fn required_str(map: &Map<String, Value>, field: &'static str) -> Result<String, ParameterError> {
    match optional(map, field) {
        None => Err(ParameterError::Missing { field }),
        Some(Value::String(s)) if s.is_empty() => Err(ParameterError::Empty { field }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ParameterError::InvalidType {
            field,
            expected: "a string",
        }),
    }
}

fn parse_attempts(value: &Value) -> Result<u32, ParameterError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse::<u32>().ok()
        }
        _ => None,
    };
    match parsed {
        Some(n) if n > 0 => Ok(n),
        _ => Err(ParameterError::InvalidAttempts {
            value: value.to_string(),
        }),
    }
}

fn file_name(key: &str) -> Option<&str> {
    key.rsplit('/').next().filter(|s| !s.is_empty())
}

/// Extension of the final segment of an object key, without the dot.
pub fn infer_extension(output_path: &str) -> Option<&str> {
    let name = file_name(output_path)?;
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
}
