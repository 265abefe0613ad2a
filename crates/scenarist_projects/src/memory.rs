//! In-process project store.

use async_trait::async_trait;
use scenarist_core::PermissionLevel;
use scenarist_error::{AccessError, AccessErrorKind, ScenaristResult};
use scenarist_interface::{
    AccessChange, AccessRecord, NewProject, ProjectRecord, ProjectStore, UserRecord,
};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i32, UserRecord>,
    projects: BTreeMap<i32, ProjectRecord>,
    access: BTreeMap<i32, AccessRecord>,
    next_user_id: i32,
    next_project_id: i32,
    next_access_id: i32,
}

fn next(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

/// Project store held in memory, for tests and single-user CLI runs.
///
/// Ids start at 1 and are never reused, like `SERIAL` columns.
#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    tables: RwLock<Tables>,
}

impl InMemoryProjectStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn create_user(
        &self,
        username: &str,
        hashed_password: &str,
    ) -> ScenaristResult<UserRecord> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == username) {
            return Err(
                AccessError::new(AccessErrorKind::UsernameTaken(username.to_string())).into(),
            );
        }
        let user = UserRecord {
            user_id: next(&mut tables.next_user_id),
            username: username.to_string(),
            hashed_password: hashed_password.to_string(),
            is_active: true,
            token_usage: BTreeMap::new(),
        };
        tables.users.insert(user.user_id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: i32) -> ScenaristResult<Option<UserRecord>> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_name(&self, username: &str) -> ScenaristResult<Option<UserRecord>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn set_token_usage(
        &self,
        user_id: i32,
        usage: &BTreeMap<String, u64>,
    ) -> ScenaristResult<()> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&user_id).ok_or_else(|| {
            AccessError::new(AccessErrorKind::UserNotFound(user_id.to_string()))
        })?;
        user.token_usage = usage.clone();
        Ok(())
    }

    async fn insert_project(&self, project: &NewProject) -> ScenaristResult<ProjectRecord> {
        let mut tables = self.tables.write().await;
        let record = ProjectRecord {
            project_id: next(&mut tables.next_project_id),
            owner_id: project.owner_id,
            topic_name: project.topic_name.clone(),
            file_path: project.file_path.clone(),
        };
        tables.projects.insert(record.project_id, record.clone());
        Ok(record)
    }

    async fn get_project(&self, project_id: i32) -> ScenaristResult<Option<ProjectRecord>> {
        Ok(self.tables.read().await.projects.get(&project_id).cloned())
    }

    async fn update_project_path(
        &self,
        project_id: i32,
        file_path: &str,
    ) -> ScenaristResult<ProjectRecord> {
        let mut tables = self.tables.write().await;
        let project = tables
            .projects
            .get_mut(&project_id)
            .ok_or_else(|| AccessError::new(AccessErrorKind::ProjectNotFound(project_id)))?;
        project.file_path = file_path.to_string();
        Ok(project.clone())
    }

    async fn delete_project(&self, project_id: i32) -> ScenaristResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .projects
            .remove(&project_id)
            .is_some())
    }

    async fn projects_owned_by(&self, user_id: i32) -> ScenaristResult<Vec<ProjectRecord>> {
        Ok(self
            .tables
            .read()
            .await
            .projects
            .values()
            .filter(|p| p.owner_id == user_id)
            .cloned()
            .collect())
    }

    async fn projects_shared_with(&self, user_id: i32) -> ScenaristResult<Vec<ProjectRecord>> {
        let tables = self.tables.read().await;
        let mut shared: Vec<ProjectRecord> = tables
            .access
            .values()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| tables.projects.get(&a.project_id).cloned())
            .collect();
        shared.sort_by_key(|p| p.project_id);
        shared.dedup_by_key(|p| p.project_id);
        Ok(shared)
    }

    async fn get_access(
        &self,
        project_id: i32,
        user_id: i32,
    ) -> ScenaristResult<Option<AccessRecord>> {
        Ok(self
            .tables
            .read()
            .await
            .access
            .values()
            .find(|a| a.project_id == project_id && a.user_id == user_id)
            .cloned())
    }

    async fn upsert_access(
        &self,
        project_id: i32,
        user_id: i32,
        level: PermissionLevel,
    ) -> ScenaristResult<AccessChange> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables
            .access
            .values_mut()
            .find(|a| a.project_id == project_id && a.user_id == user_id)
        {
            existing.permission_level = level;
            return Ok(AccessChange::Updated(existing.clone()));
        }

        let record = AccessRecord {
            project_access_id: next(&mut tables.next_access_id),
            project_id,
            user_id,
            permission_level: level,
        };
        tables.access.insert(record.project_access_id, record.clone());
        Ok(AccessChange::Created(record))
    }

    async fn delete_access_for_project(&self, project_id: i32) -> ScenaristResult<usize> {
        let mut tables = self.tables.write().await;
        let before = tables.access.len();
        tables.access.retain(|_, a| a.project_id != project_id);
        Ok(before - tables.access.len())
    }
}
