#![allow(dead_code)]

use soffice_relay::config::Config;
use soffice_relay::engine::{EngineOutput, EngineRunner};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Non-zero exit, nothing written.
    Fail,
    /// Exit 0 but no output file, like a cold-start LibreOffice.
    ExitZeroNoFile,
    /// Exit 0 and the output file is written.
    Succeed,
}

/// Simulated engine that follows a script, one step per run.
/// Runs past the end of the script fail.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    steps: Vec<Step>,
    calls: Mutex<Vec<Vec<OsString>>>,
}

impl ScriptedRunner {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails `k - 1` times, then succeeds.
    pub fn succeed_on(k: usize) -> Self {
        let mut steps = vec![Step::Fail; k - 1];
        steps.push(Step::Succeed);
        Self::new(steps)
    }

    pub fn never() -> Self {
        Self::new(Vec::new())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_args(&self) -> Option<Vec<OsString>> {
        self.calls.lock().unwrap().last().cloned()
    }
}

fn arg_after(args: &[OsString], flag: &str) -> Option<OsString> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}

impl EngineRunner for ScriptedRunner {
    fn run(&self, _program: &Path, args: &[OsString]) -> std::io::Result<EngineOutput> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(args.to_vec());
            calls.len()
        };
        let step = self.steps.get(attempt - 1).copied().unwrap_or(Step::Fail);

        match step {
            Step::Fail => Ok(EngineOutput {
                code: Some(1),
                status: "exit status: 1".into(),
                stdout: String::new(),
                stderr: format!("Fatal Error on attempt {attempt}"),
            }),
            Step::ExitZeroNoFile => Ok(EngineOutput {
                code: Some(0),
                status: "exit status: 0".into(),
                stdout: String::new(),
                stderr: String::new(),
            }),
            Step::Succeed => {
                let format = arg_after(args, "--convert-to").expect("--convert-to");
                let out_dir = PathBuf::from(arg_after(args, "--outdir").expect("--outdir"));
                let input = PathBuf::from(args.last().expect("input path"));
                let ext = format
                    .to_string_lossy()
                    .split(':')
                    .next()
                    .unwrap_or_default()
                    .to_string();
                let stem = input.file_stem().unwrap().to_string_lossy().into_owned();
                let contents = std::fs::read(&input).unwrap_or_default();
                let out = out_dir.join(format!("{stem}.{ext}"));
                std::fs::write(&out, [b"converted:".as_slice(), contents.as_slice()].concat())?;
                Ok(EngineOutput {
                    code: Some(0),
                    status: "exit status: 0".into(),
                    stdout: format!("convert {} -> {}", input.display(), out.display()),
                    stderr: String::new(),
                })
            }
        }
    }
}

/// Engine whose executable cannot be started.
pub struct MissingEngine;

impl EngineRunner for MissingEngine {
    fn run(&self, program: &Path, _args: &[OsString]) -> std::io::Result<EngineOutput> {
        Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", program.display()),
        ))
    }
}

pub fn test_config(staging_root: &Path) -> Config {
    let mut cfg = Config::default();
    cfg.engine.path = "soffice-test".into();
    cfg.staging.root_dir = staging_root.display().to_string();
    cfg
}

/// Number of entries directly under `dir`.
pub fn leftover_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|rd| rd.count()).unwrap_or(0)
}
