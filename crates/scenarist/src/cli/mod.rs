//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the scenarist binary.

mod commands;
mod context;
mod file;
mod project;
mod stage;

pub use commands::{
    AlgorithmArg, Cli, Commands, FileCommands, LevelArg, OutputFormat, ProjectCommands,
};
pub use context::{ProjectHandle, build_engine, load_config, parse_project_id};
pub use file::handle_file_command;
pub use project::handle_project_command;
pub use stage::{handle_stage_command, init_project, pipeline_options, render_reports};
