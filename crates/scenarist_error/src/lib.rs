//! Error types for the Scenarist pipeline.
//!
//! This crate provides the foundation error types used throughout the Scenarist workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use scenarist_error::{ScenaristResult, HttpError};
//!
//! fn fetch_data() -> ScenaristResult<String> {
//!     Err(HttpError::new("Connection refused"))?
//! }
//!
//! match fetch_data() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod access;
mod builder;
mod config;
#[cfg(feature = "database")]
mod database;
mod error;
mod http;
mod json;
mod llm;
mod storage;
mod workflow;

pub use access::{AccessError, AccessErrorKind};
pub use builder::{BuilderError, BuilderErrorKind};
pub use config::ConfigError;
#[cfg(feature = "database")]
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{ScenaristError, ScenaristErrorKind, ScenaristResult};
pub use http::HttpError;
pub use json::JsonError;
pub use llm::{LlmError, LlmErrorKind, RetryableError};
pub use storage::{StorageError, StorageErrorKind};
pub use workflow::{WorkflowError, WorkflowErrorKind};
