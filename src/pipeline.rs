use crate::{
    config::Config,
    convert::Converter,
    engine::EngineRunner,
    error::{InvocationError, ParameterError},
    report::InvocationReport,
    request::ConversionRequest,
    staging::StagingWorkspace,
    storage::ObjectStore,
    util::{hash_file, now_rfc3339},
};
use serde_json::Value;
use tracing::{debug, info};

/// Download, convert, upload. One call to [`Pipeline::handle`] is one
/// invocation; nothing is shared between calls except the collaborators.
pub struct Pipeline<S: ObjectStore, R: EngineRunner> {
    cfg: Config,
    store: S,
    converter: Converter<R>,
}

impl<S: ObjectStore, R: EngineRunner> Pipeline<S, R> {
    pub fn new(cfg: &Config, store: S, runner: R) -> Self {
        Self {
            cfg: cfg.clone(),
            store,
            converter: Converter::new(cfg, runner),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn converter(&self) -> &Converter<R> {
        &self.converter
    }

    pub fn resolve(&self, raw: &Value) -> Result<ConversionRequest, ParameterError> {
        ConversionRequest::resolve(raw, self.cfg.retry.default_attempts)
    }

    pub fn handle(&self, raw: &Value) -> Result<InvocationReport, InvocationError> {
        let req = self.resolve(raw)?;
        self.run(&req)
    }

    /// Runs an already resolved request inside a fresh workspace.
    pub fn run(&self, req: &ConversionRequest) -> Result<InvocationReport, InvocationError> {
        let workspace =
            StagingWorkspace::create(&self.cfg.staging).map_err(InvocationError::Workspace)?;
        let result = self.run_in(&workspace, req);
        workspace.close();
        result
    }

    fn run_in(
        &self,
        workspace: &StagingWorkspace,
        req: &ConversionRequest,
    ) -> Result<InvocationReport, InvocationError> {
        let started = now_rfc3339();

        let download_path = workspace.download_path(req.input_file_name());
        self.store
            .download(&req.input_bucket, &req.input_path, &download_path)?;
        info!(
            "Successfully downloaded \"{}/{}\".",
            req.input_bucket, req.input_path
        );

        let converted = self.converter.convert(
            &download_path,
            workspace.path(),
            &req.convert_to,
            req.num_attempts,
        )?;
        debug!(
            "converted {} -> {} in {} attempt(s)",
            download_path.display(),
            converted.path.display(),
            converted.attempts
        );

        let (output_bytes, output_sha256) =
            hash_file(&converted.path).map_err(InvocationError::Workspace)?;

        self.store
            .upload(&converted.path, &req.output_bucket, &req.output_path)?;
        info!(
            "Successfully uploaded converted document to \"{}/{}\".",
            req.output_bucket, req.output_path
        );

        Ok(InvocationReport {
            source: format!("{}/{}", req.input_bucket, req.input_path),
            destination: format!("{}/{}", req.output_bucket, req.output_path),
            convert_to: req.convert_to.to_string(),
            format_inferred: req.format_inferred,
            attempts: converted.attempts,
            output_bytes,
            output_sha256,
            started,
            finished: now_rfc3339(),
        })
    }
}
