use serde::{Deserialize, Serialize};
use std::process::Output;

/// Captured result of one engine process run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

impl EngineOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<Output> for EngineOutput {
    fn from(output: Output) -> Self {
        Self {
            code: output.status.code(),
            status: output.status.to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineDiag {
    pub program: String,
    pub version: Option<String>,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}
