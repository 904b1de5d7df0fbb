// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Resume planning
//!
//! Pairs a pipeline definition with the history of a previous attempt and
//! decides what a new attempt may reuse.

mod candidates;
mod chain;
mod eligibility;
mod matcher;
mod plan;

pub use candidates::{
    list_resume_candidates, parallel_index_of, resolve_resume_point, StageGroupSummary,
};
pub use chain::{
    latest_in_chain_filter, FilterExpression, FilterField, FilterValue, ResumeChainTracker,
};
pub use eligibility::{check_resumable, check_resume_history_visible};
pub use matcher::{
    ElementMatch, PairingMode, RecordCursor, StageExecutionMatcher, ValidatedPairing,
};
pub use plan::{build_resume_plan, ResumePlan, ResumePlanBuilder};
