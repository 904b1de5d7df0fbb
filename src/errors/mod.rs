// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Error types for resume planning
//!
//! Every planning error is an "invalid request": the run or resume point the
//! caller picked cannot be resumed as asked. The remaining variants cover the
//! file and store plumbing around the core.

mod recovery;

pub use recovery::RecoverySuggestion;

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for stage-resume operations
pub type ResumeResult<T> = Result<T, ResumeError>;

/// Main error type for stage-resume
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum ResumeError {
    // ─────────────────────────────────────────────────────────────────────────
    // Planning Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Invalid pipeline: {reason}")]
    #[diagnostic(
        code(stage_resume::invalid_pipeline),
        help("Check the pipeline definition with 'stage-resume validate'")
    )]
    InvalidPipeline { reason: String },

    #[error("Execution '{execution_id}' has no stage execution history")]
    #[diagnostic(
        code(stage_resume::no_execution_history),
        help("Only executions that recorded stage executions can be resumed")
    )]
    NoExecutionHistory { execution_id: String },

    #[error(
        "Stage '{stage}' needs {required} stage execution(s) but only {available} remain in the execution history"
    )]
    #[diagnostic(
        code(stage_resume::insufficient_stage_executions),
        help("The pipeline may have changed since this execution ran, or the resume point lies beyond the last attempted stage")
    )]
    InsufficientStageExecutions {
        stage: String,
        required: usize,
        available: usize,
    },

    #[error("Stage '{stage}' does not match its execution: expected {expected}, found {found}")]
    #[diagnostic(
        code(stage_resume::stage_type_mismatch),
        help("The pipeline definition changed since this execution ran; start a fresh execution instead")
    )]
    StageTypeMismatch {
        stage: String,
        expected: String,
        found: String,
    },

    #[error("Execution '{execution_id}' is a {found} execution, not a pipeline execution")]
    #[diagnostic(
        code(stage_resume::wrong_workflow_type),
        help("Only pipeline executions can be resumed")
    )]
    WrongWorkflowType { execution_id: String, found: String },

    #[error(
        "Execution '{execution_id}' has status {status}; only executions with status {allowed} can be resumed"
    )]
    #[diagnostic(code(stage_resume::invalid_status))]
    InvalidStatus {
        execution_id: String,
        status: String,
        allowed: String,
    },

    #[error("Execution '{execution_id}' is not the latest attempt in resume chain '{chain_id}'")]
    #[diagnostic(
        code(stage_resume::not_latest_in_chain),
        help("Resume the latest execution of this chain instead")
    )]
    NotLatestInChain {
        execution_id: String,
        chain_id: String,
    },

    #[error("No stage of execution '{execution_id}' progressed past admission")]
    #[diagnostic(
        code(stage_resume::no_stage_progressed),
        help("The execution failed before any stage started (for example during artifact collection); re-run it from scratch")
    )]
    NoStageProgressed { execution_id: String },

    #[error("Execution '{execution_id}' cannot be linked to itself")]
    #[diagnostic(
        code(stage_resume::self_link),
        help("Link the resumed attempt to the execution it resumed from")
    )]
    SelfLink { execution_id: String },

    #[error("Stage '{stage}' is not a stage of this pipeline that the execution reached")]
    #[diagnostic(code(stage_resume::stage_not_found))]
    StageNotFound { stage: String },

    #[error("No runtime state instance recorded for stage element '{element}'")]
    #[diagnostic(
        code(stage_resume::missing_state_instance),
        help("State instances are keyed by stage element display name")
    )]
    MissingStateInstance { element: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Store Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Execution '{id}' not found")]
    #[diagnostic(
        code(stage_resume::execution_not_found),
        help("Import the execution record with 'stage-resume import'")
    )]
    ExecutionNotFound { id: String },

    #[error("Store error: {message}")]
    #[diagnostic(code(stage_resume::store_error))]
    Store { message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // File Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(stage_resume::file_read_error))]
    FileRead { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(stage_resume::file_write_error))]
    FileWrite { path: PathBuf, error: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(stage_resume::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(stage_resume::yaml_error))]
    Yaml { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(stage_resume::json_error))]
    Json { message: String },
}

impl From<std::io::Error> for ResumeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for ResumeError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for ResumeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl ResumeError {
    /// Create an invalid pipeline error
    pub fn invalid_pipeline(reason: impl Into<String>) -> Self {
        Self::InvalidPipeline {
            reason: reason.into(),
        }
    }

    /// Create a type mismatch error for a stage
    pub fn type_mismatch(
        stage: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::StageTypeMismatch {
            stage: stage.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a store error from anything printable
    pub fn store(message: impl std::fmt::Display) -> Self {
        Self::Store {
            message: message.to_string(),
        }
    }

    /// Whether this error rejects the caller's request rather than reporting
    /// an infrastructure failure
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            Self::InvalidPipeline { .. }
                | Self::NoExecutionHistory { .. }
                | Self::InsufficientStageExecutions { .. }
                | Self::StageTypeMismatch { .. }
                | Self::WrongWorkflowType { .. }
                | Self::InvalidStatus { .. }
                | Self::NotLatestInChain { .. }
                | Self::NoStageProgressed { .. }
                | Self::SelfLink { .. }
                | Self::StageNotFound { .. }
                | Self::MissingStateInstance { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = ResumeError::InsufficientStageExecutions {
            stage: "deploy".into(),
            required: 3,
            available: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("deploy"));
        assert!(msg.contains('3'));
        assert!(msg.contains('1'));

        let err = ResumeError::type_mismatch("qa", "approval data", "sub-executions");
        assert_eq!(
            err.to_string(),
            "Stage 'qa' does not match its execution: expected approval data, found sub-executions"
        );
    }

    #[test]
    fn test_invalid_request_classification() {
        assert!(ResumeError::StageNotFound { stage: "x".into() }.is_invalid_request());
        assert!(ResumeError::invalid_pipeline("empty").is_invalid_request());
        assert!(ResumeError::SelfLink {
            execution_id: "e1".into()
        }
        .is_invalid_request());
        assert!(!ResumeError::store("disk full").is_invalid_request());
        assert!(!ResumeError::Io {
            message: "denied".into()
        }
        .is_invalid_request());
    }

    #[test]
    fn test_invalid_pipeline_help_is_generic() {
        let help = ResumeError::invalid_pipeline("parallel index 1 after index 2")
            .help()
            .map(|h| h.to_string());
        assert_eq!(
            help.as_deref(),
            Some("Check the pipeline definition with 'stage-resume validate'")
        );
    }

    #[test]
    fn test_from_json_error() {
        let err: ResumeError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, ResumeError::Json { .. }));
    }
}
