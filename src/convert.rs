//! Bounded-retry invocation of the conversion engine.
//!
//! Headless LibreOffice is unreliable on a cold start: the first run often
//! exits early, and some runs exit 0 without writing anything. An attempt
//! therefore only counts as a success when the exit code is zero *and* the
//! expected output file exists afterwards.
//!
//! The loop is a small state machine:
//!
//! ```text
//! Attempting(1) -> Attempting(2) -> ... -> Attempting(n) -> Exhausted
//!       \               \                       \
//!        +---------------+-----------------------+--> Succeeded
//! ```

use crate::config::Config;
use crate::engine::EngineRunner;
use crate::error::ConversionError;
use crate::request::TargetFormat;
use crate::staging::expected_output_path;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Flags passed on every run, between the profile override and `--convert-to`.
const HEADLESS_FLAGS: &[&str] = &[
    "--headless",
    "--invisible",
    "--nodefault",
    "--nofirststartwizard",
    "--nolockcheck",
    "--nologo",
    "--norestore",
    "--writer",
];

/// One engine run. Only the last one survives the loop.
#[derive(Debug, Clone)]
pub struct ConversionAttempt {
    pub index: u32,
    pub code: Option<i32>,
    pub status: String,
    pub stdout: String,
    pub stderr: String,
    pub succeeded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub path: PathBuf,
    pub attempts: u32,
}

#[derive(Debug)]
enum AttemptState {
    Attempting(u32),
    Succeeded(ConversionAttempt),
    Exhausted(ConversionAttempt),
}

pub struct Converter<R: EngineRunner> {
    program: PathBuf,
    user_installation: String,
    delay: Duration,
    runner: R,
}

impl<R: EngineRunner> Converter<R> {
    pub fn new(cfg: &Config, runner: R) -> Self {
        Self {
            program: PathBuf::from(&cfg.engine.path),
            user_installation: cfg.engine.user_installation.clone(),
            delay: Duration::from_millis(cfg.retry.delay_ms),
            runner,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// The full argument list for one run; the input path is always last.
    pub fn command_args(&self, input: &Path, out_dir: &Path, format: &TargetFormat) -> Vec<OsString> {
        let mut args = Vec::with_capacity(HEADLESS_FLAGS.len() + 6);
        args.push(OsString::from(format!(
            "-env:UserInstallation={}",
            self.user_installation
        )));
        args.extend(HEADLESS_FLAGS.iter().map(|flag| OsString::from(*flag)));
        args.push("--convert-to".into());
        args.push(format.as_str().into());
        args.push("--outdir".into());
        args.push(out_dir.as_os_str().to_owned());
        args.push(input.as_os_str().to_owned());
        args
    }

    /// Converts `input` into `out_dir`, running the engine at most
    /// `num_attempts` times.
    pub fn convert(
        &self,
        input: &Path,
        out_dir: &Path,
        format: &TargetFormat,
        num_attempts: u32,
    ) -> Result<Converted, ConversionError> {
        let num_attempts = num_attempts.max(1);
        let expected = expected_output_path(out_dir, input, format);
        let args = self.command_args(input, out_dir, format);

        let mut state = AttemptState::Attempting(1);
        loop {
            state = match state {
                AttemptState::Attempting(index) => {
                    if index > 1 && !self.delay.is_zero() {
                        std::thread::sleep(self.delay);
                    }
                    let attempt = self.attempt(index, &args, &expected)?;
                    if attempt.succeeded {
                        info!(
                            "Conversion successful on attempt {}/{}. stdout: \"{}\". stderr: \"{}\".",
                            index, num_attempts, attempt.stdout, attempt.stderr
                        );
                        AttemptState::Succeeded(attempt)
                    } else {
                        warn!(
                            "Conversion attempt {}/{} failed ({}). stdout: \"{}\". stderr: \"{}\".",
                            index, num_attempts, attempt.status, attempt.stdout, attempt.stderr
                        );
                        if index >= num_attempts {
                            AttemptState::Exhausted(attempt)
                        } else {
                            AttemptState::Attempting(index + 1)
                        }
                    }
                }
                AttemptState::Succeeded(attempt) => {
                    return Ok(Converted {
                        path: expected,
                        attempts: attempt.index,
                    });
                }
                AttemptState::Exhausted(attempt) => {
                    return Err(ConversionError::Exhausted {
                        attempt: attempt.index,
                        num_attempts,
                        status: attempt.status,
                        stdout: attempt.stdout,
                        stderr: attempt.stderr,
                    });
                }
            };
        }
    }

    fn attempt(
        &self,
        index: u32,
        args: &[OsString],
        expected: &Path,
    ) -> Result<ConversionAttempt, ConversionError> {
        let out = self
            .runner
            .run(&self.program, args)
            .map_err(|source| ConversionError::Launch {
                program: self.program.clone(),
                source,
            })?;
        // Exit 0 alone is not trusted; the file has to be there too.
        let succeeded = out.success() && expected.exists();
        Ok(ConversionAttempt {
            index,
            code: out.code,
            status: out.status,
            stdout: out.stdout,
            stderr: out.stderr,
            succeeded,
        })
    }
}
