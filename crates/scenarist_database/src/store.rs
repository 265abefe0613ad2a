//! PostgreSQL implementation of [`ProjectStore`].

use crate::connection::{PgPool, database_url_from_env, establish_pool, run_migrations};
use crate::models::{
    AccessRow, NewAccessRow, NewProjectRow, NewUserRow, ProjectRow, UserRow,
};
use crate::schema::{project_access, projects, users};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind as DieselErrorKind, Error as DieselError};
use scenarist_core::PermissionLevel;
use scenarist_error::{
    AccessError, AccessErrorKind, DatabaseError, DatabaseErrorKind, ScenaristResult,
};
use scenarist_interface::{
    AccessChange, AccessRecord, NewProject, ProjectRecord, ProjectStore, UserRecord,
};
use std::collections::BTreeMap;

/// Project store backed by PostgreSQL with connection pooling.
#[derive(Clone)]
pub struct PgProjectStore {
    pool: PgPool,
}

impl std::fmt::Debug for PgProjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgProjectStore")
            .field("max_size", &self.pool.max_size())
            .finish()
    }
}

impl PgProjectStore {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with `DATABASE_URL`, pool size 10, and apply migrations.
    pub fn from_env() -> ScenaristResult<Self> {
        let url = database_url_from_env()?;
        Self::connect(&url, 10)
    }

    /// Connect to `database_url` and apply migrations.
    pub fn connect(database_url: &str, pool_size: u32) -> ScenaristResult<Self> {
        let pool = establish_pool(database_url, pool_size)?;
        let mut conn = pool.get().map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Pool(e.to_string()))
        })?;
        run_migrations(&mut conn)?;
        Ok(Self { pool })
    }

    /// Run a query on the blocking pool.
    async fn run<T, F>(&self, op: F) -> ScenaristResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> ScenaristResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                DatabaseError::new(DatabaseErrorKind::Pool(format!(
                    "Failed to get connection from pool: {}",
                    e
                )))
            })?;
            op(&mut conn)
        })
        .await
        .map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Task(e.to_string()))
        })?
    }
}

fn db(err: DieselError) -> DatabaseError {
    DatabaseError::from(err)
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    #[tracing::instrument(skip(self, hashed_password))]
    async fn create_user(
        &self,
        username: &str,
        hashed_password: &str,
    ) -> ScenaristResult<UserRecord> {
        let (username, hashed_password) = (username.to_string(), hashed_password.to_string());
        self.run(move |conn| {
            let inserted = diesel::insert_into(users::table)
                .values(&NewUserRow {
                    username: &username,
                    hashed_password: &hashed_password,
                })
                .returning(UserRow::as_returning())
                .get_result(conn);

            match inserted {
                Ok(row) => Ok(UserRecord::try_from(row)?),
                Err(DieselError::DatabaseError(DieselErrorKind::UniqueViolation, _)) => {
                    Err(AccessError::new(AccessErrorKind::UsernameTaken(username)).into())
                }
                Err(e) => Err(db(e).into()),
            }
        })
        .await
    }

    async fn get_user(&self, user_id: i32) -> ScenaristResult<Option<UserRecord>> {
        self.run(move |conn| {
            let row = users::table
                .find(user_id)
                .select(UserRow::as_select())
                .first(conn)
                .optional()
                .map_err(db)?;
            Ok(row.map(UserRecord::try_from).transpose()?)
        })
        .await
    }

    async fn find_user_by_name(&self, username: &str) -> ScenaristResult<Option<UserRecord>> {
        let username = username.to_string();
        self.run(move |conn| {
            let row = users::table
                .filter(users::username.eq(&username))
                .select(UserRow::as_select())
                .first(conn)
                .optional()
                .map_err(db)?;
            Ok(row.map(UserRecord::try_from).transpose()?)
        })
        .await
    }

    #[tracing::instrument(skip(self, usage))]
    async fn set_token_usage(
        &self,
        user_id: i32,
        usage: &BTreeMap<String, u64>,
    ) -> ScenaristResult<()> {
        let value = serde_json::to_value(usage).map_err(DatabaseError::from)?;
        self.run(move |conn| {
            let updated = diesel::update(users::table.find(user_id))
                .set(users::token_usage.eq(value))
                .execute(conn)
                .map_err(db)?;
            if updated == 0 {
                return Err(
                    AccessError::new(AccessErrorKind::UserNotFound(user_id.to_string())).into(),
                );
            }
            Ok(())
        })
        .await
    }

    #[tracing::instrument(skip(self, project), fields(owner_id = project.owner_id, topic = %project.topic_name))]
    async fn insert_project(&self, project: &NewProject) -> ScenaristResult<ProjectRecord> {
        let project = project.clone();
        self.run(move |conn| {
            let row = diesel::insert_into(projects::table)
                .values(&NewProjectRow {
                    owner_id: project.owner_id,
                    topic_name: &project.topic_name,
                    file_path: &project.file_path,
                })
                .returning(ProjectRow::as_returning())
                .get_result(conn)
                .map_err(db)?;
            Ok(row.into())
        })
        .await
    }

    async fn get_project(&self, project_id: i32) -> ScenaristResult<Option<ProjectRecord>> {
        self.run(move |conn| {
            let row = projects::table
                .find(project_id)
                .select(ProjectRow::as_select())
                .first(conn)
                .optional()
                .map_err(db)?;
            Ok(row.map(ProjectRecord::from))
        })
        .await
    }

    async fn update_project_path(
        &self,
        project_id: i32,
        file_path: &str,
    ) -> ScenaristResult<ProjectRecord> {
        let file_path = file_path.to_string();
        self.run(move |conn| {
            let row = diesel::update(projects::table.find(project_id))
                .set(projects::file_path.eq(&file_path))
                .returning(ProjectRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(db)?;
            row.map(ProjectRecord::from).ok_or_else(|| {
                AccessError::new(AccessErrorKind::ProjectNotFound(project_id)).into()
            })
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_project(&self, project_id: i32) -> ScenaristResult<bool> {
        self.run(move |conn| {
            let deleted = diesel::delete(projects::table.find(project_id))
                .execute(conn)
                .map_err(db)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn projects_owned_by(&self, user_id: i32) -> ScenaristResult<Vec<ProjectRecord>> {
        self.run(move |conn| {
            let rows = projects::table
                .filter(projects::owner_id.eq(user_id))
                .order(projects::project_id.asc())
                .select(ProjectRow::as_select())
                .load(conn)
                .map_err(db)?;
            Ok(rows.into_iter().map(ProjectRecord::from).collect())
        })
        .await
    }

    async fn projects_shared_with(&self, user_id: i32) -> ScenaristResult<Vec<ProjectRecord>> {
        self.run(move |conn| {
            let rows = projects::table
                .inner_join(project_access::table)
                .filter(project_access::user_id.eq(user_id))
                .select(ProjectRow::as_select())
                .distinct()
                .order(projects::project_id.asc())
                .load(conn)
                .map_err(db)?;
            Ok(rows.into_iter().map(ProjectRecord::from).collect())
        })
        .await
    }

    async fn get_access(
        &self,
        project_id: i32,
        user_id: i32,
    ) -> ScenaristResult<Option<AccessRecord>> {
        self.run(move |conn| {
            let row = project_access::table
                .filter(project_access::project_id.eq(project_id))
                .filter(project_access::user_id.eq(user_id))
                .select(AccessRow::as_select())
                .first(conn)
                .optional()
                .map_err(db)?;
            Ok(row.map(AccessRecord::try_from).transpose()?)
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn upsert_access(
        &self,
        project_id: i32,
        user_id: i32,
        level: PermissionLevel,
    ) -> ScenaristResult<AccessChange> {
        self.run(move |conn| {
            let level = level.to_string();
            let (created, row) = conn
                .transaction::<_, DieselError, _>(|conn| {
                    let existing = project_access::table
                        .filter(project_access::project_id.eq(project_id))
                        .filter(project_access::user_id.eq(user_id))
                        .select(AccessRow::as_select())
                        .first(conn)
                        .optional()?;

                    match existing {
                        Some(row) => {
                            diesel::update(project_access::table.find(row.project_access_id))
                                .set(project_access::permission_level.eq(&level))
                                .returning(AccessRow::as_returning())
                                .get_result(conn)
                                .map(|row| (false, row))
                        }
                        None => diesel::insert_into(project_access::table)
                            .values(&NewAccessRow {
                                project_id,
                                user_id,
                                permission_level: &level,
                            })
                            .returning(AccessRow::as_returning())
                            .get_result(conn)
                            .map(|row| (true, row)),
                    }
                })
                .map_err(db)?;

            let record = AccessRecord::try_from(row)?;
            Ok(if created {
                AccessChange::Created(record)
            } else {
                AccessChange::Updated(record)
            })
        })
        .await
    }

    async fn delete_access_for_project(&self, project_id: i32) -> ScenaristResult<usize> {
        self.run(move |conn| {
            Ok(
                diesel::delete(project_access::table.filter(project_access::project_id.eq(project_id)))
                    .execute(conn)
                    .map_err(db)?,
            )
        })
        .await
    }
}
