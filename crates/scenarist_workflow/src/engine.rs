//! Workflow engine: shared state and helpers used by every stage.

use crate::{PipelineOptions, PromptBook, StageReport, UsageMeter, WorkflowConfig};
use scenarist_core::{
    Attachment, AttachmentMime, GenerateRequest, GenerateRequestBuilder, GenerateResponse,
    TokenUsage,
};
use scenarist_error::{
    ScenaristResult, StorageError, StorageErrorKind, WorkflowError, WorkflowErrorKind,
};
use scenarist_interface::{LlmDriver, StructuredResponse};
use scenarist_storage::{ArtifactStore, FileSystemArtifactStore, ProjectLayout};
use std::path::Path;

/// Highest accepted number of series for the structure stage.
pub const MAX_SERIES: u32 = 10;

/// Runs the five pipeline stages against a project folder.
///
/// Stages communicate only through files in the project layout, so each one
/// can be invoked on its own after its inputs exist. Every model call goes
/// through the [`LlmDriver`]; retries and rate limiting are the driver's job.
/// Tokens of every returned response are added to the engine's
/// [`UsageMeter`], including calls made by stages that later fail.
///
/// # Example
///
/// ```rust,ignore
/// use scenarist_models::GeminiClient;
/// use scenarist_storage::ProjectLayout;
/// use scenarist_workflow::{PipelineOptions, PromptBook, WorkflowConfig, WorkflowEngine};
///
/// let engine = WorkflowEngine::new(
///     GeminiClient::new()?,
///     PromptBook::bundled()?,
///     WorkflowConfig::default(),
/// );
/// let layout = ProjectLayout::new("projects_root/1/proj_1_Arctic_convoys");
/// let reports = engine.run_pipeline(&layout, &PipelineOptions::new(3)).await?;
/// ```
pub struct WorkflowEngine<D: LlmDriver, S: ArtifactStore = FileSystemArtifactStore> {
    pub(crate) driver: D,
    pub(crate) store: S,
    pub(crate) prompts: PromptBook,
    pub(crate) config: WorkflowConfig,
    pub(crate) meter: UsageMeter,
}

impl<D: LlmDriver> WorkflowEngine<D> {
    /// Engine over the local filesystem.
    pub fn new(driver: D, prompts: PromptBook, config: WorkflowConfig) -> Self {
        Self::with_store(driver, FileSystemArtifactStore::new(), prompts, config)
    }
}

impl<D: LlmDriver, S: ArtifactStore> WorkflowEngine<D, S> {
    /// Engine over a custom artifact store.
    pub fn with_store(driver: D, store: S, prompts: PromptBook, config: WorkflowConfig) -> Self {
        Self {
            driver,
            store,
            prompts,
            config,
            meter: UsageMeter::new(),
        }
    }

    /// Model driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Artifact store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Prompt templates.
    pub fn prompts(&self) -> &PromptBook {
        &self.prompts
    }

    /// Current settings.
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Tokens spent by every call so far, whether or not its stage finished.
    pub fn spent(&self) -> TokenUsage {
        self.meter.usage()
    }

    /// Spent tokens, resetting the meter.
    pub fn take_spent(&self) -> TokenUsage {
        self.meter.take()
    }

    /// Replace the settings for subsequent stages.
    pub fn set_config(&mut self, config: WorkflowConfig) {
        self.config = config;
    }

    /// Run expand, search and check per algorithm, structure, then write.
    ///
    /// Stops at the first failing stage; artifacts of completed stages stay
    /// on disk so the failed stage can be rerun alone.
    #[tracing::instrument(
        skip(self, layout, options),
        fields(
            project = %layout.root().display(),
            num_series = options.num_series,
            algorithms = options.algorithms.len()
        )
    )]
    pub async fn run_pipeline(
        &self,
        layout: &ProjectLayout,
        options: &PipelineOptions,
    ) -> ScenaristResult<Vec<StageReport>> {
        check_series_count(options.num_series)?;

        let mut reports = Vec::new();
        reports.push(self.expand_database(layout).await?);
        for algorithm in &options.algorithms {
            reports.push(self.find_connections(layout, *algorithm).await?);
        }
        for algorithm in &options.algorithms {
            reports.push(self.check_hypotheses(layout, *algorithm).await?);
        }
        reports.push(self.build_script_structure(layout, options.num_series).await?);
        reports.push(self.write_script_text(layout, &options.write).await?);

        let total: u64 = reports.iter().map(|r| r.usage.total_tokens).sum();
        tracing::info!(stages = reports.len(), total_tokens = total, "Pipeline complete");
        Ok(reports)
    }

    /// Free-text call, metered.
    pub(crate) async fn call_llm(
        &self,
        request: &GenerateRequest,
    ) -> ScenaristResult<GenerateResponse> {
        let response = self.driver.call_llm(request).await?;
        self.meter.record(response.usage);
        Ok(response)
    }

    /// Schema-constrained call, metered before the output is validated.
    pub(crate) async fn structured_call_llm(
        &self,
        request: &GenerateRequest,
        schema: &serde_json::Value,
    ) -> ScenaristResult<StructuredResponse> {
        let response = self.driver.structured_call_llm(request, schema).await?;
        self.meter.record(response.usage);
        Ok(response)
    }

    /// Request with the configured model override applied.
    pub(crate) fn request(
        &self,
        prompt: String,
        attachments: Vec<Attachment>,
        temperature: f32,
        max_output_tokens: u32,
    ) -> GenerateRequestBuilder {
        let mut builder = GenerateRequest::builder();
        builder
            .prompt(prompt)
            .attachments(attachments)
            .model(self.config.model().clone())
            .temperature(temperature)
            .max_output_tokens(max_output_tokens);
        builder
    }

    /// Fails with `MissingInput` unless `path` exists.
    pub(crate) async fn require(
        &self,
        path: &Path,
        stage: &str,
        producer: &str,
    ) -> ScenaristResult<()> {
        if self.store.exists(path).await? {
            return Ok(());
        }
        Err(WorkflowError::new(WorkflowErrorKind::MissingInput {
            stage: stage.to_string(),
            artifact: path.display().to_string(),
            producer: producer.to_string(),
        })
        .into())
    }

    /// Every `DB/` document as an attachment.
    ///
    /// # Errors
    ///
    /// `NoSources` when `DB/` is empty; `UnsupportedFormat` for anything
    /// other than `.txt` and `.pdf`.
    pub(crate) async fn source_attachments(
        &self,
        layout: &ProjectLayout,
    ) -> ScenaristResult<Vec<Attachment>> {
        let sources = self.store.list_sources(layout).await?;
        if sources.is_empty() {
            return Err(WorkflowError::new(WorkflowErrorKind::NoSources(
                layout.db_dir().display().to_string(),
            ))
            .into());
        }

        let mut attachments = Vec::with_capacity(sources.len());
        for path in sources {
            let mime = AttachmentMime::from_path(&path).ok_or_else(|| {
                StorageError::new(StorageErrorKind::UnsupportedFormat(
                    path.display().to_string(),
                ))
            })?;
            let data = self.store.read_bytes(&path).await?;
            attachments.push(Attachment::new(file_name(&path), mime, data));
        }
        tracing::debug!(count = attachments.len(), "Loaded source documents");
        Ok(attachments)
    }

    /// Text artifact as an attachment named `name`.
    pub(crate) async fn text_attachment(
        &self,
        path: &Path,
        name: &str,
    ) -> ScenaristResult<Attachment> {
        let content = self.store.read_text(path).await?;
        Ok(Attachment::text(name, content))
    }
}

pub(crate) fn check_series_count(num_series: u32) -> Result<(), WorkflowError> {
    if (1..=MAX_SERIES).contains(&num_series) {
        Ok(())
    } else {
        Err(WorkflowError::new(WorkflowErrorKind::InvalidSeriesCount {
            requested: num_series,
            max: MAX_SERIES,
        }))
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
