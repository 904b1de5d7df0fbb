// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! # stage-resume - Checkpoint/resume planning for multi-stage pipelines
//!
//! When a pipeline execution fails part-way through, `stage-resume` works out
//! how a new attempt can reuse what already succeeded.
//!
//! ## Features
//!
//! - **Stage execution matching** - Pair stage groups with the records that ran them
//! - **Resume plans** - Rewrite completed stages into resume variants
//! - **Resume candidates** - List the phases an execution reached
//! - **Eligibility checks** - Decide whether an execution may be resumed at all
//! - **Resume chains** - Link successive attempts and track the latest one
//!
//! ## Quick Start
//!
//! ```bash
//! # Where can this run be resumed from?
//! stage-resume candidates -p pipeline.yaml run.json
//!
//! # Build the definition for the next attempt
//! stage-resume plan -p pipeline.yaml -s states.json run.json --from-stage deploy
//!
//! # Record that run-2 resumed run-1
//! stage-resume link run-2 run-1
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod execution;
pub mod pipeline;
pub mod resume;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use errors::{ResumeError, ResumeResult};
pub use execution::{ExecutionRecord, StageExecutionRecord, StateInstanceMap};
pub use pipeline::{PipelineDefinition, StageElement, StageGroup};
pub use resume::{
    build_resume_plan, check_resumable, list_resume_candidates, ResumeChainTracker, ResumePlan,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
