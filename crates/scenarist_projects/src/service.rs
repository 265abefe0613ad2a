//! Access rules and project folder bookkeeping.

use chrono::NaiveDate;
use scenarist_core::PermissionLevel;
use scenarist_error::{AccessError, AccessErrorKind, ScenaristResult};
use scenarist_interface::{AccessChange, NewProject, ProjectRecord, ProjectStore, UserRecord};
use scenarist_storage::{ArtifactStore, FileSystemArtifactStore, ProjectLayout, project_path};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

/// Project operations with authorization.
///
/// # Example
///
/// ```rust
/// use scenarist_core::PermissionLevel;
/// use scenarist_projects::{InMemoryProjectStore, ProjectService};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = ProjectService::new(InMemoryProjectStore::new(), "/tmp/projects_root");
/// let owner = service.register_user("alice", "hash").await?;
/// let project = service.create_project(owner.user_id, "Arctic convoys").await?;
///
/// service.authorize(project.project_id, owner.user_id, PermissionLevel::Write).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ProjectService<S> {
    store: S,
    artifacts: FileSystemArtifactStore,
    projects_root: PathBuf,
}

impl<S: ProjectStore> ProjectService<S> {
    /// Service over `store`, creating project folders under `projects_root`.
    pub fn new(store: S, projects_root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            artifacts: FileSystemArtifactStore::new(),
            projects_root: projects_root.into(),
        }
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Root under which `<owner>/proj_<id>_<topic>` folders live.
    pub fn projects_root(&self) -> &std::path::Path {
        &self.projects_root
    }

    /// Folder layout of a project.
    pub fn layout(project: &ProjectRecord) -> ProjectLayout {
        ProjectLayout::new(&project.file_path)
    }

    /// Register a user with a caller-computed password hash.
    ///
    /// # Errors
    ///
    /// `UsernameTaken` when the name is already registered.
    #[instrument(skip(self, hashed_password))]
    pub async fn register_user(
        &self,
        username: &str,
        hashed_password: &str,
    ) -> ScenaristResult<UserRecord> {
        if self.store.find_user_by_name(username).await?.is_some() {
            return Err(
                AccessError::new(AccessErrorKind::UsernameTaken(username.to_string())).into(),
            );
        }
        let user = self.store.create_user(username, hashed_password).await?;
        info!(user_id = user.user_id, "Registered user");
        Ok(user)
    }

    /// Look up a user by name.
    pub async fn find_user(&self, username: &str) -> ScenaristResult<UserRecord> {
        self.store
            .find_user_by_name(username)
            .await?
            .ok_or_else(|| AccessError::new(AccessErrorKind::UserNotFound(username.to_string())).into())
    }

    /// Create a project row, its folder layout and the owner's `WRITE` grant.
    ///
    /// The row is inserted first to obtain the id used in the folder name.
    #[instrument(skip(self))]
    pub async fn create_project(
        &self,
        owner_id: i32,
        topic_name: &str,
    ) -> ScenaristResult<ProjectRecord> {
        self.active_user(owner_id).await?;

        let project = self
            .store
            .insert_project(&NewProject {
                owner_id,
                topic_name: topic_name.to_string(),
                file_path: String::new(),
            })
            .await?;

        let folder = project_path(
            &self.projects_root,
            owner_id,
            project.project_id,
            topic_name,
        );
        ProjectLayout::new(&folder).init().await?;

        let project = self
            .store
            .update_project_path(project.project_id, &folder.to_string_lossy())
            .await?;
        self.store
            .upsert_access(project.project_id, owner_id, PermissionLevel::Write)
            .await?;

        info!(
            project_id = project.project_id,
            path = %project.file_path,
            "Created project"
        );
        Ok(project)
    }

    /// Fetch a project the user may read.
    pub async fn get_project(&self, project_id: i32, user_id: i32) -> ScenaristResult<ProjectRecord> {
        self.authorize(project_id, user_id, PermissionLevel::Read)
            .await
    }

    /// Projects the user owns or has been granted, ordered by id.
    #[instrument(skip(self))]
    pub async fn list_accessible(&self, user_id: i32) -> ScenaristResult<Vec<ProjectRecord>> {
        let mut projects: BTreeMap<i32, ProjectRecord> = BTreeMap::new();
        for project in self.store.projects_owned_by(user_id).await? {
            projects.insert(project.project_id, project);
        }
        for project in self.store.projects_shared_with(user_id).await? {
            projects.entry(project.project_id).or_insert(project);
        }
        debug!(count = projects.len(), "Listed accessible projects");
        Ok(projects.into_values().collect())
    }

    /// Effective level of a user on a project.
    ///
    /// Owners hold `WRITE`; others hold their access row's level, or nothing.
    ///
    /// # Errors
    ///
    /// `ProjectNotFound` when the project does not exist.
    pub async fn access_level(
        &self,
        project_id: i32,
        user_id: i32,
    ) -> ScenaristResult<Option<PermissionLevel>> {
        let project = self.require_project(project_id).await?;
        self.level_on(&project, user_id).await
    }

    /// Check that a user holds at least `required` on a project.
    ///
    /// Reading stage files needs `READ`; running stages and editing files
    /// need `WRITE`. Inactive accounts are denied.
    #[instrument(skip(self))]
    pub async fn authorize(
        &self,
        project_id: i32,
        user_id: i32,
        required: PermissionLevel,
    ) -> ScenaristResult<ProjectRecord> {
        let project = self.require_project(project_id).await?;
        let user = self.store.get_user(user_id).await?;

        let granted = match user {
            Some(user) if user.is_active => self.level_on(&project, user_id).await?,
            _ => None,
        };

        match granted {
            Some(level) if level.satisfies(required) => Ok(project),
            _ => {
                warn!(?granted, "Access denied");
                Err(AccessError::new(AccessErrorKind::Denied {
                    project_id,
                    required: required.to_string(),
                })
                .into())
            }
        }
    }

    /// Grant `level` on a project to another user. Owner only.
    #[instrument(skip(self))]
    pub async fn share(
        &self,
        project_id: i32,
        acting_user_id: i32,
        target_username: &str,
        level: PermissionLevel,
    ) -> ScenaristResult<AccessChange> {
        let project = self.require_project(project_id).await?;
        if project.owner_id != acting_user_id {
            return Err(
                AccessError::new(AccessErrorKind::OwnerOnly("share the project".to_string()))
                    .into(),
            );
        }

        let target = self.find_user(target_username).await?;
        let change = self
            .store
            .upsert_access(project_id, target.user_id, level)
            .await?;
        info!(target_user = target.user_id, %level, ?change, "Shared project");
        Ok(change)
    }

    /// Delete a project: access rows, then its folder, then the row. Owner only.
    #[instrument(skip(self))]
    pub async fn delete_project(&self, project_id: i32, acting_user_id: i32) -> ScenaristResult<()> {
        let project = self.require_project(project_id).await?;
        if project.owner_id != acting_user_id {
            return Err(
                AccessError::new(AccessErrorKind::OwnerOnly("delete the project".to_string()))
                    .into(),
            );
        }

        let removed = self.store.delete_access_for_project(project_id).await?;
        if !project.file_path.is_empty() {
            self.artifacts
                .remove_project(&Self::layout(&project))
                .await?;
        }
        self.store.delete_project(project_id).await?;

        info!(access_rows = removed, "Deleted project");
        Ok(())
    }

    /// Add `tokens` to the user's usage for `date` and return the new map.
    ///
    /// Usage is keyed `YYYY-MM-DD`; a new day starts a new entry.
    #[instrument(skip(self))]
    pub async fn record_token_usage(
        &self,
        user_id: i32,
        tokens: u64,
        date: NaiveDate,
    ) -> ScenaristResult<BTreeMap<String, u64>> {
        let user = self.store.get_user(user_id).await?.ok_or_else(|| {
            AccessError::new(AccessErrorKind::UserNotFound(user_id.to_string()))
        })?;

        let mut usage = user.token_usage;
        *usage.entry(date.format("%Y-%m-%d").to_string()).or_insert(0) += tokens;
        self.store.set_token_usage(user_id, &usage).await?;

        debug!(tokens, "Recorded token usage");
        Ok(usage)
    }

    async fn require_project(&self, project_id: i32) -> ScenaristResult<ProjectRecord> {
        self.store
            .get_project(project_id)
            .await?
            .ok_or_else(|| AccessError::new(AccessErrorKind::ProjectNotFound(project_id)).into())
    }

    async fn active_user(&self, user_id: i32) -> ScenaristResult<UserRecord> {
        match self.store.get_user(user_id).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(AccessError::new(AccessErrorKind::UserNotFound(user_id.to_string())).into()),
        }
    }

    async fn level_on(
        &self,
        project: &ProjectRecord,
        user_id: i32,
    ) -> ScenaristResult<Option<PermissionLevel>> {
        if project.owner_id == user_id {
            return Ok(Some(PermissionLevel::Write));
        }
        Ok(self
            .store
            .get_access(project.project_id, user_id)
            .await?
            .map(|a| a.permission_level))
    }
}
