//! Scenarist - documentary script writing with LLMs
//!
//! Scenarist turns a folder of source documents into a multi-episode
//! documentary script through five stages, each one reading and writing plain
//! files in the project folder:
//!
//! 1. **expand** - extend the source database
//! 2. **search** - multi-lens search for hidden connections and blind spots
//! 3. **check** - verify hypotheses with web search
//! 4. **structure** - outline series and chapters as JSON
//! 5. **write** - write every chapter, then render Markdown
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use scenarist::{GeminiClient, PipelineOptions, ProjectLayout, PromptBook, WorkflowConfig, WorkflowEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let layout = ProjectLayout::new("projects_root/1/proj_1_Arctic_convoys");
//!     layout.init().await?;
//!
//!     let engine = WorkflowEngine::new(
//!         GeminiClient::new()?,
//!         PromptBook::bundled()?,
//!         WorkflowConfig::default(),
//!     );
//!     engine.run_pipeline(&layout, &PipelineOptions::new(3)).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `database` - PostgreSQL users, projects and sharing
//!
//! # Architecture
//!
//! - `scenarist_error` - Error types
//! - `scenarist_core` - Requests, script types, stages, permissions
//! - `scenarist_interface` - `LlmDriver` and `ProjectStore` traits
//! - `scenarist_rate_limit` - Configuration, tiers, rate limiting and retry
//! - `scenarist_models` - Gemini client
//! - `scenarist_storage` - Project layout and artifact files
//! - `scenarist_projects` - Access rules and project bookkeeping
//! - `scenarist_database` - PostgreSQL store
//! - `scenarist_workflow` - The five stages
//!
//! This crate (`scenarist`) re-exports everything for convenience.

pub mod cli;

pub use scenarist_core::*;
pub use scenarist_error::*;
pub use scenarist_interface::*;
pub use scenarist_models::*;
pub use scenarist_projects::*;
pub use scenarist_rate_limit::*;
pub use scenarist_storage::*;
pub use scenarist_workflow::*;

#[cfg(feature = "database")]
pub use scenarist_database::*;
