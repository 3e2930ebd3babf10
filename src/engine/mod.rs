pub mod process;
pub mod types;

use std::ffi::OsString;
use std::path::Path;

pub use process::ProcessRunner;
pub use types::{EngineDiag, EngineOutput};

/// Runs the conversion engine to completion and captures its output.
///
/// `Err` means the process could not be started; a process that ran and
/// failed is an `Ok` with a non-zero [`EngineOutput::code`].
pub trait EngineRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> std::io::Result<EngineOutput>;
}

impl<R: EngineRunner + ?Sized> EngineRunner for &R {
    fn run(&self, program: &Path, args: &[OsString]) -> std::io::Result<EngineOutput> {
        (**self).run(program, args)
    }
}

/// Asks the engine for its version string.
pub fn doctor(runner: &dyn EngineRunner, program: &Path) -> EngineDiag {
    let args = [OsString::from("--version")];
    match runner.run(program, &args) {
        Ok(out) if out.success() => EngineDiag {
            program: program.display().to_string(),
            version: out.stdout.lines().next().map(str::to_string),
            ok: true,
            error: None,
        },
        Ok(out) => EngineDiag {
            program: program.display().to_string(),
            version: None,
            ok: false,
            error: Some(format!("{}: {}", out.status, out.stderr)),
        },
        Err(err) => EngineDiag {
            program: program.display().to_string(),
            version: None,
            ok: false,
            error: Some(err.to_string()),
        },
    }
}
