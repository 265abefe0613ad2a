//! Multi-stage script-writing workflow for Scenarist.
//!
//! The pipeline turns a folder of source documents into a written
//! documentary script:
//!
//! 1. **expand** – extend the source database (`FACTS/db_extension.txt`)
//! 2. **search** – multi-lens hypothesis search per algorithm (`HYP/`)
//! 3. **check** – web-grounded verification per algorithm (`CHECK/`)
//! 4. **structure** – series and chapter outline (`STRUCTURE/`)
//! 5. **write** – chapter-by-chapter text (`SCENARIO/`)
//!
//! Stages only talk through project files, so any stage can be rerun once
//! its inputs exist. Prompts come from a [`PromptBook`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod merge;
mod prompts;
mod report;
mod stages;
mod usage;

pub use config::{PipelineOptions, WorkflowConfig, WorkflowConfigBuilder, WriteOptions};
pub use engine::{MAX_SERIES, WorkflowEngine};
pub use merge::HypothesisSet;
pub use prompts::PromptBook;
pub use report::StageReport;
pub use usage::UsageMeter;
