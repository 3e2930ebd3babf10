use super::{EngineOutput, EngineRunner};
use crate::config::Config;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Runs the engine as a child process with captured stdout/stderr.
///
/// No timeout is applied; the hosting environment bounds the invocation.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    env: BTreeMap<String, String>,
}

impl ProcessRunner {
    pub fn new(cfg: &Config) -> Self {
        Self {
            env: cfg.engine.env.clone(),
        }
    }
}

impl EngineRunner for ProcessRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> std::io::Result<EngineOutput> {
        debug!("exec {} {:?}", program.display(), args);
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        for (k, v) in &self.env {
            cmd.env(k, v);
        }
        let output = cmd.output()?;
        Ok(EngineOutput::from(output))
    }
}
