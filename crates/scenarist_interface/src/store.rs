//! Relational store trait for users, projects and access rows.

use async_trait::async_trait;
use scenarist_core::PermissionLevel;
use scenarist_error::ScenaristResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Primary key
    pub user_id: i32,
    /// Unique login name
    pub username: String,
    /// Password hash supplied by the caller
    pub hashed_password: String,
    /// Disabled accounts cannot act on projects
    pub is_active: bool,
    /// Tokens spent per day, keyed `YYYY-MM-DD`
    pub token_usage: BTreeMap<String, u64>,
}

/// A project row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Primary key
    pub project_id: i32,
    /// Owning user
    pub owner_id: i32,
    /// Topic the project is about
    pub topic_name: String,
    /// Absolute or root-relative project folder; empty until created on disk
    pub file_path: String,
}

/// Insertable project row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    /// Owning user
    pub owner_id: i32,
    /// Topic the project is about
    pub topic_name: String,
    /// Project folder
    pub file_path: String,
}

/// A project_access row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRecord {
    /// Primary key
    pub project_access_id: i32,
    /// Project the grant applies to
    pub project_id: i32,
    /// Grantee
    pub user_id: i32,
    /// Granted level
    pub permission_level: PermissionLevel,
}

/// Outcome of an access upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessChange {
    /// A new row was inserted
    Created(AccessRecord),
    /// An existing row changed level
    Updated(AccessRecord),
}

impl AccessChange {
    /// The row after the change.
    pub fn record(&self) -> &AccessRecord {
        match self {
            AccessChange::Created(r) | AccessChange::Updated(r) => r,
        }
    }
}

/// Persistence for users, projects and access grants.
///
/// Implementations are thin CRUD; authorization rules live in the project
/// service built on top of this trait.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Insert a user. A taken username is an `UsernameTaken` access error.
    async fn create_user(&self, username: &str, hashed_password: &str)
    -> ScenaristResult<UserRecord>;

    /// Look up a user by id.
    async fn get_user(&self, user_id: i32) -> ScenaristResult<Option<UserRecord>>;

    /// Look up a user by username.
    async fn find_user_by_name(&self, username: &str) -> ScenaristResult<Option<UserRecord>>;

    /// Replace the user's token usage map.
    async fn set_token_usage(
        &self,
        user_id: i32,
        usage: &BTreeMap<String, u64>,
    ) -> ScenaristResult<()>;

    /// Insert a project and return the stored row.
    async fn insert_project(&self, project: &NewProject) -> ScenaristResult<ProjectRecord>;

    /// Look up a project by id.
    async fn get_project(&self, project_id: i32) -> ScenaristResult<Option<ProjectRecord>>;

    /// Set the project's folder path.
    async fn update_project_path(
        &self,
        project_id: i32,
        file_path: &str,
    ) -> ScenaristResult<ProjectRecord>;

    /// Delete the project row. Returns false when it did not exist.
    async fn delete_project(&self, project_id: i32) -> ScenaristResult<bool>;

    /// Projects owned by the user.
    async fn projects_owned_by(&self, user_id: i32) -> ScenaristResult<Vec<ProjectRecord>>;

    /// Projects the user holds an access row for.
    async fn projects_shared_with(&self, user_id: i32) -> ScenaristResult<Vec<ProjectRecord>>;

    /// The access row for a (project, user) pair.
    async fn get_access(
        &self,
        project_id: i32,
        user_id: i32,
    ) -> ScenaristResult<Option<AccessRecord>>;

    /// Insert or update the access row for a (project, user) pair.
    async fn upsert_access(
        &self,
        project_id: i32,
        user_id: i32,
        level: PermissionLevel,
    ) -> ScenaristResult<AccessChange>;

    /// Remove every access row of a project, returning how many were removed.
    async fn delete_access_for_project(&self, project_id: i32) -> ScenaristResult<usize>;
}
