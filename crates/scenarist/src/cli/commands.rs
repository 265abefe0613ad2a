//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use scenarist_core::{FactsAlgorithm, PermissionLevel};
use std::path::PathBuf;

/// Scenarist - documentary script writing with LLMs
#[derive(Parser, Debug)]
#[command(name = "scenarist")]
#[command(about = "Turn source documents into a documentary script: expand, search, check, structure, write", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Project folder, or project id when `--user` is given
    #[arg(short, long, global = true, env = "SCENARIST_PROJECT")]
    pub project: Option<String>,

    /// Acting user (requires the `database` feature)
    #[arg(short, long, global = true, env = "SCENARIST_USER")]
    pub user: Option<String>,

    /// Model override for every call
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Rate limit tier from the configuration
    #[arg(long, global = true)]
    pub tier: Option<String>,

    /// Configuration file layered over the bundled defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Fail immediately on transient provider errors
    #[arg(long, global = true)]
    pub no_retry: bool,

    /// Retry attempts for transient provider errors
    #[arg(long, global = true)]
    pub max_retries: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// How stage reports and project listings are printed
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Human,
    /// Pretty-printed JSON
    Json,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the project folder layout and copy source documents into DB/
    Init {
        /// Source documents (.txt or .pdf)
        #[arg(long = "source")]
        sources: Vec<PathBuf>,
    },

    /// Stage 1: extend the source database
    Expand,

    /// Stage 2: multi-lens hypothesis search
    Search {
        /// Fact-finding algorithm
        #[arg(long, value_enum, default_value = "main")]
        algorithm: AlgorithmArg,

        /// Reuse lens files left by an interrupted run
        #[arg(long)]
        resume: bool,
    },

    /// Stage 3: verify hypotheses with web search
    Check {
        /// Fact-finding algorithm
        #[arg(long, value_enum, default_value = "main")]
        algorithm: AlgorithmArg,
    },

    /// Stage 4: outline the series and chapters
    Structure {
        /// Number of series (1-10)
        #[arg(long, default_value = "3")]
        num_series: u32,
    },

    /// Stage 5: write chapter text
    Write {
        /// Sampling temperature
        #[arg(long)]
        temperature: Option<f32>,

        /// Output token cap per chapter
        #[arg(long)]
        max_output_tokens: Option<u32>,
    },

    /// Run every stage in order
    Run {
        /// Number of series (1-10)
        #[arg(long, default_value = "3")]
        num_series: u32,

        /// Algorithms to search and check (default: both)
        #[arg(long = "algorithm", value_enum)]
        algorithms: Vec<AlgorithmArg>,

        /// Reuse lens files left by an interrupted run
        #[arg(long)]
        resume: bool,
    },

    /// Read or replace editable stage files
    #[command(subcommand)]
    File(FileCommands),

    /// Manage users, projects and sharing
    #[command(subcommand)]
    Project(ProjectCommands),
}

/// Stage file subcommands
#[derive(Subcommand, Debug)]
pub enum FileCommands {
    /// Print a stage file (empty when it does not exist yet)
    Read {
        /// plus_facts, interesting_facts_main, check_facts_main, ...
        stage: String,
    },

    /// Replace a stage file
    Write {
        /// plus_facts, interesting_facts_main, check_facts_main, ...
        stage: String,

        /// File with the new content (stdin when omitted)
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

/// Project management subcommands
#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Register a user
    Register {
        /// Username
        username: String,

        /// Password hash computed by the caller
        #[arg(long)]
        password_hash: String,
    },

    /// Create a project owned by `--user`
    Create {
        /// Topic name
        topic: String,
    },

    /// List projects `--user` owns or was granted
    List,

    /// Grant another user access to `--project`
    Share {
        /// User receiving access
        username: String,

        /// Access level
        #[arg(long, value_enum, default_value = "read")]
        level: LevelArg,
    },

    /// Delete `--project` and its folder
    Delete,
}

/// Fact-finding algorithm argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlgorithmArg {
    /// Hidden connections between facts
    Main,
    /// Gaps in the source material
    #[value(alias = "blind_spots")]
    Blind,
}

impl From<AlgorithmArg> for FactsAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Main => FactsAlgorithm::Main,
            AlgorithmArg::Blind => FactsAlgorithm::BlindSpots,
        }
    }
}

/// Access level argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelArg {
    /// Read stage files
    Read,
    /// Run stages and edit files
    Write,
    /// Full control
    Admin,
}

impl From<LevelArg> for PermissionLevel {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Read => PermissionLevel::Read,
            LevelArg::Write => PermissionLevel::Write,
            LevelArg::Admin => PermissionLevel::Admin,
        }
    }
}
