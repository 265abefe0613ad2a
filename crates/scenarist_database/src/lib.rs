//! PostgreSQL persistence for Scenarist.
//!
//! Implements [`ProjectStore`](scenarist_interface::ProjectStore) over the
//! `users`, `projects` and `project_access` tables with Diesel. Queries run
//! on a blocking thread pool against an r2d2 connection pool.
//!
//! # Example
//!
//! ```rust,no_run
//! use scenarist_database::PgProjectStore;
//! use scenarist_interface::ProjectStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Requires DATABASE_URL=postgresql://localhost/scenarist
//! let store = PgProjectStore::from_env()?;
//! let user = store.find_user_by_name("alice").await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod models;
mod store;

pub mod schema;

pub use connection::{PgPool, database_url_from_env, establish_pool, run_migrations};
pub use models::{AccessRow, NewAccessRow, NewProjectRow, NewUserRow, ProjectRow, UserRow};
pub use store::PgProjectStore;

use scenarist_error::DatabaseError;

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
