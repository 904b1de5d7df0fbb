// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Execution records
//!
//! The historical log of one attempt at running a pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{ResumeError, ResumeResult};

/// Execution status shared by executions and stage executions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Failed,
    Skipped,
    Queued,
    Running,
    Waiting,
    Aborted,
    Expired,
    Rejected,
    Error,
}

impl ExecutionStatus {
    /// Statuses an execution must be in to be resumed
    pub const RESUMABLE: [ExecutionStatus; 5] = [
        Self::Aborted,
        Self::Failed,
        Self::Rejected,
        Self::Expired,
        Self::Error,
    ];

    /// Whether an execution in this status may be resumed
    pub fn is_resumable(&self) -> bool {
        Self::RESUMABLE.contains(self)
    }

    /// Comma-separated list of the resumable statuses
    pub fn resumable_list() -> String {
        let names: Vec<String> = Self::RESUMABLE.iter().map(|s| s.to_string()).collect();
        format!("[{}]", names.join(", "))
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Skipped => "SKIPPED",
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Waiting => "WAITING",
            Self::Aborted => "ABORTED",
            Self::Expired => "EXPIRED",
            Self::Rejected => "REJECTED",
            Self::Error => "ERROR",
        };
        write!(f, "{}", name)
    }
}

/// Kind of workflow an execution ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowType {
    Pipeline,
    Workflow,
}

impl std::fmt::Display for WorkflowType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pipeline => write!(f, "pipeline"),
            Self::Workflow => write!(f, "workflow"),
        }
    }
}

/// One attempt at running a pipeline definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Execution id
    pub id: String,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Id of the pipeline definition that was executed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_id: Option<String>,

    /// Workflow type tag
    pub workflow_type: WorkflowType,

    /// Overall status
    pub status: ExecutionStatus,

    /// Creation time in milliseconds since the Unix epoch
    #[serde(default)]
    pub created_at: u64,

    /// Stage executions in the order they were recorded
    #[serde(default)]
    pub stage_executions: Vec<StageExecutionRecord>,

    /// Resume chain this execution belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_chain_id: Option<String>,

    /// Whether this is the latest attempt of its resume chain
    #[serde(default)]
    pub latest_in_chain: bool,
}

impl ExecutionRecord {
    /// Load an execution record from a JSON file
    pub fn from_file(path: &Path) -> ResumeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ResumeError::FileRead {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse an execution record from a JSON string
    pub fn from_json(json: &str) -> ResumeResult<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    /// Serialize the execution record to pretty JSON
    pub fn to_json(&self) -> ResumeResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Whether this execution belongs to a resume chain
    pub fn in_chain(&self) -> bool {
        self.resume_chain_id.is_some()
    }

    /// Name for display, falling back to the id
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// One executed occurrence of a stage element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageExecutionRecord {
    /// Stage execution status
    pub status: ExecutionStatus,

    /// Id of the stage element this occurrence belongs to
    pub stage_element_id: String,

    /// Whether this occurrence is one branch of a fan-out
    #[serde(default)]
    pub looped: bool,

    /// Child sub-executions created for this occurrence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_executions: Option<Vec<SubExecutionRef>>,

    /// Approval decision, for approval stages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalMarker>,
}

impl StageExecutionRecord {
    /// Whether this record carries at least one child sub-execution
    pub fn has_sub_executions(&self) -> bool {
        self.sub_executions.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// Whether this record carries approval data
    pub fn has_approval(&self) -> bool {
        self.approval.is_some()
    }

    /// Ids of the child sub-executions, in order
    pub fn sub_execution_ids(&self) -> impl Iterator<Item = &str> {
        self.sub_executions
            .iter()
            .flatten()
            .map(|s| s.id.as_str())
    }

    /// Short description of what this record carries, for error messages
    pub fn content_summary(&self) -> String {
        let mut parts = Vec::new();
        if self.looped {
            parts.push("looped".to_string());
        }
        match (self.has_sub_executions(), self.has_approval()) {
            (true, true) => parts.push("sub-executions and approval data".into()),
            (true, false) => parts.push("sub-executions".into()),
            (false, true) => parts.push("approval data".into()),
            (false, false) => parts.push("no data".into()),
        }
        format!("{} record with {}", self.status, parts.join(" "))
    }
}

/// Reference to a child sub-execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubExecutionRef {
    /// Sub-execution id
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Sub-workflow that was executed
    #[serde(default)]
    pub workflow_id: String,
}

/// Approval decision recorded for an approval stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalMarker {
    /// Who approved or rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,

    /// Free-form comments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_execution() {
        let json = r#"{
            "id": "exec-1",
            "workflow_type": "pipeline",
            "status": "failed",
            "created_at": 1700000000000,
            "stage_executions": [
                { "status": "success", "stage_element_id": "e1", "approval": {} },
                {
                    "status": "failed",
                    "stage_element_id": "e2",
                    "sub_executions": [
                        { "id": "wx-1", "name": "deploy", "workflow_id": "wf-1" }
                    ]
                }
            ]
        }"#;

        let execution = ExecutionRecord::from_json(json).unwrap();
        assert_eq!(execution.status, ExecutionStatus::Failed);
        assert_eq!(execution.workflow_type, WorkflowType::Pipeline);
        assert!(!execution.in_chain());
        assert!(!execution.latest_in_chain);
        assert_eq!(execution.display_name(), "exec-1");

        let approval = &execution.stage_executions[0];
        assert!(approval.has_approval());
        assert!(!approval.has_sub_executions());
        assert!(!approval.looped);

        let deploy = &execution.stage_executions[1];
        assert_eq!(deploy.sub_execution_ids().collect::<Vec<_>>(), vec!["wx-1"]);
    }

    #[test]
    fn test_empty_sub_execution_list_is_no_content() {
        let record = StageExecutionRecord {
            status: ExecutionStatus::Failed,
            stage_element_id: "e".into(),
            looped: false,
            sub_executions: Some(vec![]),
            approval: None,
        };
        assert!(!record.has_sub_executions());
        assert_eq!(record.content_summary(), "FAILED record with no data");
    }

    #[test]
    fn test_resumable_statuses() {
        for status in ExecutionStatus::RESUMABLE {
            assert!(status.is_resumable());
        }
        for status in [
            ExecutionStatus::Success,
            ExecutionStatus::Running,
            ExecutionStatus::Waiting,
            ExecutionStatus::Queued,
            ExecutionStatus::Skipped,
        ] {
            assert!(!status.is_resumable());
        }
        assert_eq!(
            ExecutionStatus::resumable_list(),
            "[ABORTED, FAILED, REJECTED, EXPIRED, ERROR]"
        );
    }
}
