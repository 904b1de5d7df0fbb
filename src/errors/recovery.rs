// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Error recovery suggestions
//!
//! Provides actionable next steps when a resume request is rejected.

use super::ResumeError;
use crate::execution::ExecutionStatus;

/// A recovery suggestion with concrete steps
#[derive(Debug, Clone)]
pub struct RecoverySuggestion {
    /// Brief description of what to do
    pub action: String,
    /// Detailed steps
    pub steps: Vec<String>,
    /// Commands to run
    pub commands: Vec<String>,
}

impl RecoverySuggestion {
    /// Suggest a way forward for an error, if there is one
    pub fn for_error(error: &ResumeError) -> Option<Self> {
        match error {
            ResumeError::NotLatestInChain { chain_id, .. } => Some(Self::resume_latest(chain_id)),
            ResumeError::InvalidStatus {
                execution_id,
                status,
                ..
            } if *status == ExecutionStatus::Success.to_string() => {
                Some(Self::nothing_to_resume(execution_id))
            }
            ResumeError::InvalidStatus { execution_id, .. } => {
                Some(Self::wait_for_completion(execution_id))
            }
            ResumeError::StageNotFound { .. } | ResumeError::InsufficientStageExecutions { .. } => {
                Some(Self::pick_candidate())
            }
            ResumeError::StageTypeMismatch { stage, .. } => Some(Self::fresh_run(stage)),
            ResumeError::MissingStateInstance { element } => Some(Self::export_states(element)),
            ResumeError::ExecutionNotFound { .. } => Some(Self::import_execution()),
            _ => None,
        }
    }

    /// Suggest resuming the latest attempt of a chain
    pub fn resume_latest(chain_id: &str) -> Self {
        Self {
            action: "Resume the latest attempt instead".into(),
            steps: vec![
                format!("Resume chain '{}' already has a newer attempt", chain_id),
                "Only the latest attempt of a chain can be resumed".into(),
            ],
            commands: vec![
                "# Show the attempts of this chain:".into(),
                "stage-resume history <execution-id>".into(),
            ],
        }
    }

    /// Suggest waiting for a running execution
    pub fn wait_for_completion(execution_id: &str) -> Self {
        Self {
            action: "Wait for the execution to finish".into(),
            steps: vec![
                format!("Execution '{}' has not failed", execution_id),
                "Executions can only be resumed after they abort, fail, expire or are rejected".into(),
            ],
            commands: vec![],
        }
    }

    /// Explain that a successful execution has nothing left to resume
    pub fn nothing_to_resume(execution_id: &str) -> Self {
        Self {
            action: "Nothing to resume".into(),
            steps: vec![
                format!("Execution '{}' already succeeded", execution_id),
                "Start a new execution to run the pipeline again".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest choosing one of the listed resume candidates
    pub fn pick_candidate() -> Self {
        Self {
            action: "Choose a listed resume point".into(),
            steps: vec!["Resume points must lie within the stages the execution attempted".into()],
            commands: vec![
                "# List valid resume points:".into(),
                "stage-resume candidates -p <pipeline.yaml> <execution.json>".into(),
            ],
        }
    }

    /// Suggest starting over when definition and history disagree
    pub fn fresh_run(stage: &str) -> Self {
        Self {
            action: "Start a fresh execution".into(),
            steps: vec![
                format!("Stage '{}' no longer matches what was executed", stage),
                "The pipeline was edited after this execution ran".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest re-exporting runtime state instances
    pub fn export_states(element: &str) -> Self {
        Self {
            action: "Export the runtime state instances again".into(),
            steps: vec![
                format!("No state instance is keyed by '{}'", element),
                "The state file must contain one entry per stage element display name".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest importing an execution into the store
    pub fn import_execution() -> Self {
        Self {
            action: "Import the execution record".into(),
            steps: vec!["The execution store does not know this execution".into()],
            commands: vec!["stage-resume import <execution.json>".into()],
        }
    }
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "→ {}", self.action)?;

        for step in &self.steps {
            writeln!(f, "  {}", step)?;
        }

        if !self.commands.is_empty() {
            writeln!(f)?;
            for cmd in &self.commands {
                writeln!(f, "  {}", cmd)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestion_for_chain_error() {
        let err = ResumeError::NotLatestInChain {
            execution_id: "e1".into(),
            chain_id: "c1".into(),
        };
        let suggestion = RecoverySuggestion::for_error(&err).unwrap();
        let text = suggestion.to_string();
        assert!(text.starts_with("→ Resume the latest attempt"));
        assert!(text.contains("stage-resume history"));
    }

    #[test]
    fn test_successful_execution_has_nothing_to_resume() {
        let status_error = |status: ExecutionStatus| ResumeError::InvalidStatus {
            execution_id: "e1".into(),
            status: status.to_string(),
            allowed: ExecutionStatus::resumable_list(),
        };

        let done = RecoverySuggestion::for_error(&status_error(ExecutionStatus::Success)).unwrap();
        assert_eq!(done.action, "Nothing to resume");
        assert!(done.steps[0].contains("already succeeded"));

        let running = RecoverySuggestion::for_error(&status_error(ExecutionStatus::Running)).unwrap();
        assert_eq!(running.action, "Wait for the execution to finish");
    }

    #[test]
    fn test_no_suggestion_for_io() {
        let err = ResumeError::Io {
            message: "boom".into(),
        };
        assert!(RecoverySuggestion::for_error(&err).is_none());
    }
}
