//! Pipeline stage command handlers.

use super::commands::{AlgorithmArg, Cli, Commands, OutputFormat};
use super::context::{ProjectHandle, build_engine, load_config};
use scenarist_core::{AttachmentMime, FactsAlgorithm, PermissionLevel};
use scenarist_error::{ConfigError, JsonError, ScenaristResult, StorageError, StorageErrorKind};
use scenarist_interface::LlmDriver;
use scenarist_storage::{ArtifactStore, FileSystemArtifactStore, ProjectLayout};
use scenarist_workflow::{PipelineOptions, StageReport, WorkflowEngine, WriteOptions};
use std::path::PathBuf;

/// Handle `init` and the stage commands.
pub async fn handle_stage_command(cli: &Cli) -> ScenaristResult<()> {
    let config = load_config(cli)?;

    if let Commands::Init { sources } = &cli.command {
        let project = ProjectHandle::resolve(cli, &config, PermissionLevel::Write).await?;
        return init_project(&project.layout, sources).await;
    }

    let resume = match &cli.command {
        Commands::Search { resume, .. } | Commands::Run { resume, .. } => *resume,
        Commands::Expand
        | Commands::Check { .. }
        | Commands::Structure { .. }
        | Commands::Write { .. } => false,
        other => {
            return Err(ConfigError::new(format!("{:?} is not a stage command", other)).into());
        }
    };

    let project = ProjectHandle::resolve(cli, &config, PermissionLevel::Write).await?;
    let engine = build_engine(cli, &config, resume)?;
    let outcome = run_stage(cli, &engine, &project.layout).await;

    // Calls that returned before a failure are still billed.
    let spent = engine.take_spent();
    project.record_usage(spent.total_tokens).await?;

    let reports = outcome?;
    print!("{}", render_reports(&reports, cli.format)?);
    Ok(())
}

async fn run_stage<D: LlmDriver>(
    cli: &Cli,
    engine: &WorkflowEngine<D>,
    layout: &ProjectLayout,
) -> ScenaristResult<Vec<StageReport>> {
    let report = match &cli.command {
        Commands::Expand => engine.expand_database(layout).await?,
        Commands::Search { algorithm, .. } => {
            engine.find_connections(layout, (*algorithm).into()).await?
        }
        Commands::Check { algorithm } => {
            engine.check_hypotheses(layout, (*algorithm).into()).await?
        }
        Commands::Structure { num_series } => {
            engine.build_script_structure(layout, *num_series).await?
        }
        Commands::Write {
            temperature,
            max_output_tokens,
        } => {
            let options = WriteOptions {
                temperature: *temperature,
                max_output_tokens: *max_output_tokens,
                model: cli.model.clone(),
            };
            engine.write_script_text(layout, &options).await?
        }
        Commands::Run {
            num_series,
            algorithms,
            ..
        } => {
            let options = pipeline_options(*num_series, algorithms, cli.model.clone());
            return engine.run_pipeline(layout, &options).await;
        }
        other => {
            return Err(ConfigError::new(format!("{:?} is not a stage command", other)).into());
        }
    };
    Ok(vec![report])
}

/// Options for `run`; no `--algorithm` means both algorithms.
pub fn pipeline_options(
    num_series: u32,
    algorithms: &[AlgorithmArg],
    model: Option<String>,
) -> PipelineOptions {
    let mut options = PipelineOptions::new(num_series);
    if !algorithms.is_empty() {
        let mut selected: Vec<FactsAlgorithm> = Vec::new();
        for algorithm in algorithms.iter().copied().map(FactsAlgorithm::from) {
            if !selected.contains(&algorithm) {
                selected.push(algorithm);
            }
        }
        options.algorithms = selected;
    }
    options.write.model = model;
    options
}

/// Create the layout and copy `.txt`/`.pdf` sources into `DB/`.
#[tracing::instrument(skip(sources), fields(project = %layout.root().display(), sources = sources.len()))]
pub async fn init_project(layout: &ProjectLayout, sources: &[PathBuf]) -> ScenaristResult<()> {
    layout.init().await?;
    let store = FileSystemArtifactStore::new();

    for source in sources {
        if AttachmentMime::from_path(source).is_none() {
            return Err(StorageError::new(StorageErrorKind::UnsupportedFormat(
                source.display().to_string(),
            ))
            .into());
        }
        let name = source.file_name().ok_or_else(|| {
            StorageError::new(StorageErrorKind::InvalidPath(source.display().to_string()))
        })?;
        let data = store.read_bytes(source).await?;
        let target = layout.db_dir().join(name);
        tokio::fs::write(&target, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                target.display(),
                e
            )))
        })?;
        tracing::debug!(target = %target.display(), "Copied source document");
    }

    println!("Initialized project at {}", layout.root().display());
    let count = store.list_sources(layout).await?.len();
    println!("Source documents: {}", count);
    Ok(())
}

/// Stage reports as printed by the stage commands.
pub fn render_reports(reports: &[StageReport], format: OutputFormat) -> ScenaristResult<String> {
    if format == OutputFormat::Json {
        let mut json = serde_json::to_string_pretty(reports).map_err(JsonError::from)?;
        json.push('\n');
        return Ok(json);
    }

    let mut out = String::new();
    for report in reports {
        match report.algorithm {
            Some(algorithm) => out.push_str(&format!("{} ({})\n", report.stage, algorithm)),
            None => out.push_str(&format!("{}\n", report.stage)),
        }
        out.push_str(&format!(
            "  calls: {}  tokens: {} (prompt {}, completion {})\n",
            report.calls,
            report.usage.total_tokens,
            report.usage.prompt_tokens,
            report.usage.completion_tokens
        ));
        for output in &report.outputs {
            out.push_str(&format!("  wrote {}\n", output.display()));
        }
    }
    Ok(out)
}
