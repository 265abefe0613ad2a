//! Shared setup for command handlers: configuration, project resolution and
//! engine construction.

use super::commands::Cli;
use scenarist_core::PermissionLevel;
use scenarist_error::{ConfigError, ScenaristResult};
use scenarist_models::GeminiClient;
use scenarist_rate_limit::ScenaristConfig;
use scenarist_storage::ProjectLayout;
use scenarist_workflow::{PromptBook, WorkflowConfig, WorkflowEngine};

#[cfg(feature = "database")]
use scenarist_database::PgProjectStore;
#[cfg(feature = "database")]
use scenarist_projects::ProjectService;

/// Configuration from `--config`, or every layered source.
pub fn load_config(cli: &Cli) -> ScenaristResult<ScenaristConfig> {
    match &cli.config {
        Some(path) => ScenaristConfig::from_file(path),
        None => ScenaristConfig::load(),
    }
}

/// Workflow engine backed by Gemini, with CLI overrides applied.
pub fn build_engine(
    cli: &Cli,
    config: &ScenaristConfig,
    resume: bool,
) -> ScenaristResult<WorkflowEngine<GeminiClient>> {
    let client = GeminiClient::new_with_config(config, cli.tier.as_deref())?.with_retry(
        cli.no_retry,
        cli.max_retries,
        None,
    );
    let prompts = PromptBook::load(config.workflow.prompts_path.as_deref())?;

    let mut settings = WorkflowConfig::from(&config.workflow).with_resume(resume);
    if let Some(model) = &cli.model {
        settings = settings.with_model(Some(model.clone()));
    }
    tracing::debug!(model = ?settings.model(), resume, "Workflow engine ready");
    Ok(WorkflowEngine::new(client, prompts, settings))
}

/// A resolved project and, with accounts, who is acting on it.
pub struct ProjectHandle {
    /// Folder layout
    pub layout: ProjectLayout,
    #[cfg(feature = "database")]
    account: Option<Account>,
}

#[cfg(feature = "database")]
struct Account {
    service: ProjectService<PgProjectStore>,
    user_id: i32,
}

impl ProjectHandle {
    /// Resolve `--project`, checking `required` access when `--user` is set.
    ///
    /// Without `--user` the project argument is a folder path and no access
    /// rules apply.
    pub async fn resolve(
        cli: &Cli,
        config: &ScenaristConfig,
        required: PermissionLevel,
    ) -> ScenaristResult<Self> {
        let project = cli
            .project
            .as_deref()
            .ok_or_else(|| ConfigError::new("--project is required for this command"))?;

        match cli.user.as_deref() {
            None => Ok(Self {
                layout: ProjectLayout::new(project),
                #[cfg(feature = "database")]
                account: None,
            }),
            Some(username) => Self::resolve_for_user(config, project, username, required).await,
        }
    }

    #[cfg(feature = "database")]
    async fn resolve_for_user(
        config: &ScenaristConfig,
        project: &str,
        username: &str,
        required: PermissionLevel,
    ) -> ScenaristResult<Self> {
        let project_id = parse_project_id(project)?;
        let service = open_service(config)?;
        let user = service.find_user(username).await?;
        let record = service
            .authorize(project_id, user.user_id, required)
            .await?;
        Ok(Self {
            layout: ProjectService::<PgProjectStore>::layout(&record),
            account: Some(Account {
                service,
                user_id: user.user_id,
            }),
        })
    }

    #[cfg(not(feature = "database"))]
    async fn resolve_for_user(
        _config: &ScenaristConfig,
        _project: &str,
        _username: &str,
        _required: PermissionLevel,
    ) -> ScenaristResult<Self> {
        Err(ConfigError::new("--user requires the `database` feature").into())
    }

    /// Add `tokens` to the acting user's usage for today. No-op without an
    /// account or when nothing was spent.
    pub async fn record_usage(&self, tokens: u64) -> ScenaristResult<()> {
        #[cfg(feature = "database")]
        {
            if let Some(account) = &self.account {
                if tokens > 0 {
                    let today = chrono::Utc::now().date_naive();
                    account
                        .service
                        .record_token_usage(account.user_id, tokens, today)
                        .await?;
                }
            }
        }
        #[cfg(not(feature = "database"))]
        let _ = tokens;
        Ok(())
    }
}

/// Project id from the `--project` argument.
pub fn parse_project_id(project: &str) -> Result<i32, ConfigError> {
    project
        .parse()
        .map_err(|_| ConfigError::new(format!("Expected a project id, got '{}'", project)))
}

/// Project service over PostgreSQL (`DATABASE_URL`).
#[cfg(feature = "database")]
pub fn open_service(config: &ScenaristConfig) -> ScenaristResult<ProjectService<PgProjectStore>> {
    let store = PgProjectStore::from_env()?;
    Ok(ProjectService::new(store, &config.storage.projects_root))
}
