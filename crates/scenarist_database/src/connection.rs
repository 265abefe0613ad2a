//! Connection pool and migrations.

use crate::DatabaseResult;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use scenarist_error::{DatabaseError, DatabaseErrorKind};

/// Pooled PostgreSQL connections.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Read `DATABASE_URL` from the environment.
///
/// # Errors
///
/// Returns a connection error if the variable is not set.
pub fn database_url_from_env() -> DatabaseResult<String> {
    std::env::var("DATABASE_URL").map_err(|_| {
        DatabaseError::new(DatabaseErrorKind::Connection(
            "DATABASE_URL environment variable not set".to_string(),
        ))
    })
}

/// Build a connection pool and check out one connection to fail fast.
#[tracing::instrument(skip(database_url))]
pub fn establish_pool(database_url: &str, pool_size: u32) -> DatabaseResult<PgPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(pool_size)
        .build(manager)
        .map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Pool(format!(
                "Failed to create connection pool: {}",
                e
            )))
        })?;

    {
        let _conn = pool.get().map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Pool(format!(
                "Failed to warm up connection pool: {}",
                e
            )))
        })?;
    }

    tracing::info!(pool_size, "Database pool ready");
    Ok(pool)
}

/// Apply pending embedded migrations.
pub fn run_migrations(conn: &mut PgConnection) -> DatabaseResult<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Migration(e.to_string())))?;
    tracing::info!(count = applied.len(), "Applied database migrations");
    Ok(())
}
