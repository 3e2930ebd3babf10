//! Error taxonomy for a single invocation.
//!
//! Callers need to tell a bad request apart from a failed conversion and
//! from a storage failure, because each one has a different remedy: fix the
//! payload, retry later, or check bucket permissions. [`InvocationError`]
//! wraps the per-stage errors and [`InvocationError::kind`] gives the stable
//! name reported at the process boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Malformed or incomplete invocation payload. Never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParameterError {
    #[error("invocation payload must be a JSON object")]
    NotAnObject,

    #[error("missing required parameter \"{field}\"")]
    Missing { field: &'static str },

    #[error("parameter \"{field}\" must be {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("parameter \"{field}\" must not be empty")]
    Empty { field: &'static str },

    #[error("input_path \"{input_path}\" does not name a file")]
    NoFileName { input_path: String },

    #[error(
        "Target file type could not be inferred from output_path \"{output_path}\". Please specify convert_to."
    )]
    UninferableFormat { output_path: String },

    #[error("num_attempts must be a positive integer, got {value}")]
    InvalidAttempts { value: String },
}

/// The external engine did not produce the expected file.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Every attempt ran and none succeeded. Carries the last attempt only.
    #[error(
        "Unable to convert file. On the last attempt ({attempt}/{num_attempts}) the output was as follows - status: {status}. stdout: \"{stdout}\". stderr: \"{stderr}\"."
    )]
    Exhausted {
        attempt: u32,
        num_attempts: u32,
        status: String,
        stdout: String,
        stderr: String,
    },

    /// The engine process could not be started at all.
    #[error("failed to launch conversion engine '{program}': {source}")]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure reported by the object store collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("permission denied for {bucket}/{key}")]
    PermissionDenied { bucket: String, key: String },

    #[error("invalid object key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },

    #[error("storage I/O error for {bucket}/{key}: {source}")]
    Io {
        bucket: String,
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Everything [`crate::pipeline::Pipeline::handle`] can fail with.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("staging workspace error: {0}")]
    Workspace(#[source] std::io::Error),
}

impl InvocationError {
    /// Stable error type name used in the boundary response.
    pub fn kind(&self) -> &'static str {
        match self {
            InvocationError::Parameter(_) => "ParameterError",
            InvocationError::Conversion(_) => "ConversionError",
            InvocationError::Storage(_) => "StorageError",
            InvocationError::Workspace(_) => "WorkspaceError",
        }
    }
}
