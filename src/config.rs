use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: Engine,
    #[serde(default)]
    pub retry: Retry,
    #[serde(default)]
    pub staging: Staging,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub output: Output,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// Applies process environment overrides on top of the file values.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("LIBREOFFICE_PATH") {
            self.engine.path = path;
        }
        if let Some(raw) = lookup("DEFAULT_ATTEMPTS") {
            self.retry.default_attempts = raw
                .trim()
                .parse()
                .with_context(|| format!("DEFAULT_ATTEMPTS is not a positive integer: {raw}"))?;
        }
        if let Some(root) = lookup("SOFFICE_RELAY_STORAGE_ROOT") {
            self.storage.root = root;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.engine.path.trim().is_empty() {
            return Err(anyhow!("engine.path must not be empty"));
        }
        if self.retry.default_attempts == 0 {
            return Err(anyhow!("retry.default_attempts must be at least 1"));
        }
        if self.storage.root.trim().is_empty() {
            return Err(anyhow!("storage.root must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Engine {
    pub path: String,
    /// LibreOffice refuses to start without a writable profile directory.
    pub user_installation: String,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}
impl Default for Engine {
    fn default() -> Self {
        Self {
            path: "soffice".into(),
            user_installation: "file:///tmp/".into(),
            env: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Retry {
    pub default_attempts: u32,
    pub delay_ms: u64,
}
impl Default for Retry {
    fn default() -> Self {
        Self {
            default_attempts: 3,
            delay_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staging {
    pub root_dir: String,
    pub prefix: String,
}
impl Default for Staging {
    fn default() -> Self {
        Self {
            root_dir: "".into(),
            prefix: "soffice-relay-".into(),
        }
    }
}

impl Staging {
    pub fn root(&self) -> PathBuf {
        if self.root_dir.is_empty() {
            std::env::temp_dir()
        } else {
            PathBuf::from(&self.root_dir)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Storage {
    pub root: String,
}
impl Default for Storage {
    fn default() -> Self {
        Self {
            root: "buckets".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Output {
    pub print_summary: bool,
}
