//! Trait definitions for the Scenarist script-writing pipeline.
//!
//! This crate provides the seams between the workflow engine and its
//! backends: [`LlmDriver`] for model providers and [`ProjectStore`] for the
//! relational user/project/access store.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod driver;
mod store;

pub use driver::{LlmDriver, StructuredResponse};
pub use store::{AccessChange, AccessRecord, NewProject, ProjectRecord, ProjectStore, UserRecord};
