//! Diesel row types and their conversions to store records.

use crate::schema::{project_access, projects, users};
use diesel::prelude::*;
use scenarist_core::PermissionLevel;
use scenarist_error::{AccessError, AccessErrorKind, DatabaseError};
use scenarist_interface::{AccessRecord, ProjectRecord, UserRecord};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Database row for the `users` table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = users, primary_key(user_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// Primary key
    pub user_id: i32,
    /// Unique login name
    pub username: String,
    /// Caller-supplied password hash
    pub hashed_password: String,
    /// Account enabled
    pub is_active: bool,
    /// `{"YYYY-MM-DD": tokens}`
    pub token_usage: serde_json::Value,
}

/// Insertable row for the `users` table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    /// Unique login name
    pub username: &'a str,
    /// Caller-supplied password hash
    pub hashed_password: &'a str,
}

/// Database row for the `projects` table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = projects, primary_key(project_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    /// Primary key
    pub project_id: i32,
    /// Owning user
    pub owner_id: i32,
    /// Topic
    pub topic_name: String,
    /// Project folder
    pub file_path: String,
}

/// Insertable row for the `projects` table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = projects)]
pub struct NewProjectRow<'a> {
    /// Owning user
    pub owner_id: i32,
    /// Topic
    pub topic_name: &'a str,
    /// Project folder
    pub file_path: &'a str,
}

/// Database row for the `project_access` table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = project_access, primary_key(project_access_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AccessRow {
    /// Primary key
    pub project_access_id: i32,
    /// Project
    pub project_id: i32,
    /// Grantee
    pub user_id: i32,
    /// `READ`, `WRITE` or `ADMIN`
    pub permission_level: String,
}

/// Insertable row for the `project_access` table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = project_access)]
pub struct NewAccessRow<'a> {
    /// Project
    pub project_id: i32,
    /// Grantee
    pub user_id: i32,
    /// `READ`, `WRITE` or `ADMIN`
    pub permission_level: &'a str,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        // NULL-ish or legacy shapes read as no usage.
        let token_usage: BTreeMap<String, u64> = match row.token_usage {
            serde_json::Value::Null => BTreeMap::new(),
            value => serde_json::from_value(value)?,
        };
        Ok(UserRecord {
            user_id: row.user_id,
            username: row.username,
            hashed_password: row.hashed_password,
            is_active: row.is_active,
            token_usage,
        })
    }
}

impl From<ProjectRow> for ProjectRecord {
    fn from(row: ProjectRow) -> Self {
        ProjectRecord {
            project_id: row.project_id,
            owner_id: row.owner_id,
            topic_name: row.topic_name,
            file_path: row.file_path,
        }
    }
}

impl TryFrom<AccessRow> for AccessRecord {
    type Error = AccessError;

    fn try_from(row: AccessRow) -> Result<Self, Self::Error> {
        let permission_level = PermissionLevel::from_str(&row.permission_level).map_err(|_| {
            AccessError::new(AccessErrorKind::InvalidPermission(row.permission_level.clone()))
        })?;
        Ok(AccessRecord {
            project_access_id: row.project_access_id,
            project_id: row.project_id,
            user_id: row.user_id,
            permission_level,
        })
    }
}
