use crate::error::InvocationError;
use serde::{Deserialize, Serialize};

/// Summary of one successful invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationReport {
    pub source: String,
    pub destination: String,
    pub convert_to: String,
    pub format_inferred: bool,
    pub attempts: u32,
    pub output_bytes: u64,
    pub output_sha256: String,
    pub started: String,
    pub finished: String,
}

/// Failure body returned at the process boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(rename = "errorType")]
    pub error_type: String,
    #[serde(rename = "errorMessage")]
    pub error_message: String,
}

impl From<&InvocationError> for ErrorPayload {
    fn from(err: &InvocationError) -> Self {
        Self {
            error_type: err.kind().to_string(),
            error_message: err.to_string(),
        }
    }
}

/// Boundary response: `null` on success, an [`ErrorPayload`] otherwise.
pub fn respond(result: &Result<InvocationReport, InvocationError>) -> serde_json::Value {
    match result {
        Ok(_) => serde_json::Value::Null,
        Err(err) => serde_json::to_value(ErrorPayload::from(err)).unwrap_or_else(|_| {
            serde_json::json!({ "errorType": err.kind(), "errorMessage": err.to_string() })
        }),
    }
}
