//! Per-invocation scratch directory.
//!
//! A [`StagingWorkspace`] owns a uniquely named directory for the lifetime of
//! one invocation. Dropping it removes the directory and everything in it, so
//! every early return in the pipeline cleans up without extra bookkeeping.

use crate::config::Staging;
use crate::request::TargetFormat;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct StagingWorkspace {
    dir: TempDir,
}

impl StagingWorkspace {
    pub fn create(cfg: &Staging) -> std::io::Result<Self> {
        let root = cfg.root();
        std::fs::create_dir_all(&root)?;
        let dir = tempfile::Builder::new()
            .prefix(&cfg.prefix)
            .tempdir_in(&root)?;
        debug!("staging workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Local path the source object is downloaded to.
    pub fn download_path(&self, file_name: &str) -> PathBuf {
        self.path().join(file_name)
    }

    /// Path the engine writes for `staged_input` converted to `format`.
    pub fn output_path(&self, staged_input: &Path, format: &TargetFormat) -> PathBuf {
        expected_output_path(self.path(), staged_input, format)
    }

    /// Removes the workspace now, reporting failures instead of ignoring them.
    pub fn close(self) {
        let path = self.path().to_path_buf();
        if let Err(err) = self.dir.close() {
            warn!("failed to remove staging workspace {}: {err}", path.display());
        }
    }
}

/// `<out_dir>/<input stem>.<format extension>`, mirroring `soffice --outdir`.
pub fn expected_output_path(out_dir: &Path, input: &Path, format: &TargetFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    out_dir.join(format!("{stem}.{}", format.extension()))
}
