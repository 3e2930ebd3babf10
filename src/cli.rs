use crate::{
    config::Config,
    engine::{self, ProcessRunner},
    pipeline::Pipeline,
    report::respond,
    request::ConversionRequest,
    storage::LocalObjectStore,
    util::ensure_dir,
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "soffice-relay")]
#[command(about = "Stateless document conversion relay (object store + headless LibreOffice)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./soffice-relay.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the conversion engine starts.
    Doctor {},
    /// Validate a payload and print the normalized request.
    Resolve {
        #[command(flatten)]
        payload: PayloadArgs,
    },
    /// Run one conversion end to end.
    Invoke {
        #[command(flatten)]
        payload: PayloadArgs,
    },
}

#[derive(clap::Args, Debug)]
pub struct PayloadArgs {
    /// Invocation payload as inline JSON.
    #[arg(long, conflicts_with = "payload_file", required_unless_present = "payload_file")]
    pub payload: Option<String>,

    /// Read the payload from a file; `-` reads stdin.
    #[arg(long)]
    pub payload_file: Option<PathBuf>,
}

impl PayloadArgs {
    pub fn read(&self) -> Result<serde_json::Value> {
        let raw = match (&self.payload, &self.payload_file) {
            (Some(inline), _) => inline.clone(),
            (None, Some(path)) if path.as_os_str() == "-" => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .with_context(|| "reading payload from stdin")?;
                buf
            }
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("reading payload: {}", path.display()))?,
            (None, None) => return Err(anyhow!("no payload given")),
        };
        serde_json::from_str(&raw).with_context(|| "parsing payload JSON")
    }
}

pub fn dispatch(args: Args) -> Result<()> {
    let mut cfg = match resolve_config_path(args.config.as_deref()) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    cfg.apply_env()?;
    cfg.validate()?;

    let log_path = resolve_log_path(&cfg);
    let _guard = init_logging(&args, &cfg, log_path.as_deref())?;

    match &args.cmd {
        Command::Doctor {} => doctor(&cfg),
        Command::Resolve { payload } => resolve(&cfg, payload),
        Command::Invoke { payload } => invoke(&cfg, payload),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from("soffice-relay.toml");
    default.exists().then_some(default)
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the boundary response, so log lines go to stderr.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from("soffice-relay.log"))
}

fn doctor(cfg: &Config) -> Result<()> {
    let runner = ProcessRunner::new(cfg);
    let diag = engine::doctor(&runner, Path::new(&cfg.engine.path));
    println!("{}", serde_json::to_string_pretty(&diag)?);
    if !diag.ok {
        return Err(anyhow!("conversion engine is not usable: {}", cfg.engine.path));
    }
    Ok(())
}

fn resolve(cfg: &Config, payload: &PayloadArgs) -> Result<()> {
    let raw = payload.read()?;
    let req = ConversionRequest::resolve(&raw, cfg.retry.default_attempts)?;
    println!("{}", serde_json::to_string_pretty(&req)?);
    Ok(())
}

fn invoke(cfg: &Config, payload: &PayloadArgs) -> Result<()> {
    let raw = payload.read()?;
    let store = LocalObjectStore::new(&cfg.storage.root);
    let pipeline = Pipeline::new(cfg, store, ProcessRunner::new(cfg));

    let result = pipeline.handle(&raw);
    println!("{}", serde_json::to_string(&respond(&result))?);

    match result {
        Ok(report) => {
            info!("invocation complete: {}", report.destination);
            if cfg.output.print_summary {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
