// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for stage-resume.

pub mod candidates;
pub mod check;
pub mod history;
pub mod import;
pub mod link;
pub mod list;
pub mod plan;
pub mod validate;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ResumeConfig, CONFIG_FILE_NAME};
use crate::errors::{RecoverySuggestion, ResumeError};
use crate::store::{ExecutionStore, FilesystemExecutionStore};
use crate::utils::{print_error, print_suggestion};

/// Checkpoint/resume planning for multi-stage pipelines
#[derive(Parser, Debug)]
#[clap(
    name = "stage-resume",
    version,
    about = "Plan resumed attempts of failed multi-stage pipeline executions",
    long_about = None,
    after_help = "Examples:\n\
        stage-resume check run.json                              Check a run can be resumed\n\
        stage-resume candidates -p pipeline.yaml run.json        List resume points\n\
        stage-resume plan -p pipeline.yaml -s states.json run.json --from-stage deploy\n\
        stage-resume list                                        List stored executions\n\n\
        See 'stage-resume <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Configuration file (default: .stage-resume.yaml)
    #[clap(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether an execution can be resumed
    Check {
        /// Execution record (JSON)
        execution: PathBuf,

        /// Only check that the resume history may be shown
        #[clap(long)]
        history: bool,
    },

    /// List the stages an execution can be resumed from
    Candidates {
        /// Pipeline definition (YAML)
        #[clap(short, long)]
        pipeline: PathBuf,

        /// Execution record (JSON)
        execution: PathBuf,

        /// Output format
        #[clap(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Build the pipeline definition for a resumed attempt
    Plan {
        /// Pipeline definition (YAML)
        #[clap(short, long)]
        pipeline: PathBuf,

        /// Runtime state instances of the execution (JSON)
        #[clap(short, long)]
        states: PathBuf,

        /// Execution record (JSON)
        execution: PathBuf,

        /// Parallel index to resume from
        #[clap(long, conflicts_with = "from_stage", required_unless_present = "from_stage")]
        index: Option<u32>,

        /// Stage group or element name to resume from
        #[clap(long, value_name = "NAME")]
        from_stage: Option<String>,

        /// Output file (default: stdout)
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Link a resumed execution to the attempt it resumed
    Link {
        /// Id of the new attempt
        new_id: String,

        /// Id of the attempt that was resumed
        previous_id: String,
    },

    /// Show earlier and later attempts of a stored execution
    History {
        /// Execution id
        execution_id: String,
    },

    /// List stored executions
    List {
        /// Include attempts superseded by a later resume
        #[clap(short, long)]
        all: bool,

        /// Only executions of this pipeline
        #[clap(long)]
        pipeline: Option<String>,
    },

    /// Import execution records into the store
    Import {
        /// Execution records (JSON)
        #[clap(required = true)]
        executions: Vec<PathBuf>,
    },

    /// Validate a pipeline definition
    Validate {
        /// Pipeline definition to validate
        pipeline: PathBuf,
    },
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct Context {
    pub verbose: bool,
    pub working_dir: PathBuf,
    pub config: ResumeConfig,
}

impl Context {
    /// Load configuration from `config_path`, or from the working directory
    pub fn load(config_path: Option<&Path>, verbose: bool) -> miette::Result<Self> {
        let working_dir = std::env::current_dir()
            .map_err(|e| miette::miette!("Failed to get current directory: {}", e))?;

        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| working_dir.join(CONFIG_FILE_NAME));
        let config = ResumeConfig::load(&config_path)?;

        Ok(Self {
            verbose,
            working_dir,
            config,
        })
    }

    /// Open the configured execution store
    pub fn open_store(&self) -> miette::Result<Arc<dyn ExecutionStore>> {
        let store = FilesystemExecutionStore::new(self.config.store_dir(&self.working_dir))?;
        Ok(Arc::new(store))
    }
}

/// Report a rejected request with its recovery suggestion, then hand the
/// error back for miette to render
///
/// Store and file failures are left to miette alone.
pub(crate) fn reject(error: ResumeError) -> miette::Report {
    if error.is_invalid_request() {
        print_error(&format!("Request rejected: {}", error));
    }
    if let Some(suggestion) = RecoverySuggestion::for_error(&error) {
        print_suggestion(&suggestion);
    }
    error.into()
}
