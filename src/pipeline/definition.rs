// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Pipeline definition structures
//!
//! Defines the schema for pipeline definition files and the resume variants
//! that stand in for already-executed stage elements.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::{ResumeError, ResumeResult};

/// Display name that candidate listings use for every approval element
pub const APPROVAL_DISPLAY_NAME: &str = "Approval";

/// Pipeline definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    /// Definition version (for future compatibility)
    #[serde(default = "default_version")]
    pub version: String,

    /// Pipeline name
    pub name: String,

    /// Pipeline description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Stage groups in pipeline order
    #[serde(default)]
    pub stage_groups: Vec<StageGroup>,
}

fn default_version() -> String {
    "1".to_string()
}

impl PipelineDefinition {
    /// Load a pipeline definition from a YAML file
    pub fn from_file(path: &Path) -> ResumeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ResumeError::FileRead {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_yaml(&content)
    }

    /// Parse a pipeline definition from a YAML string
    pub fn from_yaml(yaml: &str) -> ResumeResult<Self> {
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// Serialize the pipeline definition to YAML
    pub fn to_yaml(&self) -> ResumeResult<String> {
        serde_yaml::to_string(self).map_err(Into::into)
    }

    /// Get a stage group by name
    pub fn get_group(&self, name: &str) -> Option<&StageGroup> {
        self.stage_groups.iter().find(|g| g.name == name)
    }

    /// Iterate over every stage element in pipeline order
    pub fn elements(&self) -> impl Iterator<Item = &StageElement> {
        self.stage_groups.iter().flat_map(|g| g.elements.iter())
    }

    /// Total number of stage elements across all groups
    pub fn element_count(&self) -> usize {
        self.stage_groups.iter().map(|g| g.elements.len()).sum()
    }
}

/// A stage group: one position in pipeline order
///
/// Groups sharing a parallel index execute concurrently; index ordering
/// defines the sequential phases of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageGroup {
    /// Group name
    pub name: String,

    /// Parallel index of this group
    pub parallel_index: u32,

    /// Stage elements in this group
    #[serde(default)]
    pub elements: Vec<StageElement>,
}

/// One configured unit of work in a pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageElement {
    /// Unique element id (matched against stage execution records)
    pub id: String,

    /// Display name (key for runtime state instances)
    pub name: String,

    /// Element kind and kind-specific properties
    #[serde(flatten)]
    pub kind: StageElementKind,
}

impl StageElement {
    /// Base category of this element
    pub fn category(&self) -> ElementCategory {
        self.kind.category()
    }

    /// Name shown in resume candidate listings
    pub fn display_name(&self) -> &str {
        match self.category() {
            ElementCategory::Approval => APPROVAL_DISPLAY_NAME,
            ElementCategory::Single | ElementCategory::Looped => &self.name,
        }
    }
}

/// Stage element kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StageElementKind {
    /// Manual approval gate
    Approval,

    /// Runs one sub-workflow
    SingleExecution {
        /// Referenced sub-workflow id
        workflow_id: String,
    },

    /// Fans a sub-workflow out across runtime-determined targets
    LoopedExecution {
        /// Referenced sub-workflow id
        workflow_id: String,

        /// Variable the fan-out iterates over
        #[serde(default, skip_serializing_if = "Option::is_none")]
        loop_over: Option<String>,
    },

    /// Replays a prior approval decision
    ApprovalResume {
        prev_state_execution_id: String,
        prev_execution_id: String,
    },

    /// Reattaches to a prior sub-workflow execution
    SingleExecutionResume {
        prev_state_execution_id: String,
        prev_execution_id: String,
        prev_sub_execution_ids: Vec<String>,
    },

    /// Reattaches to every branch of a prior fan-out
    LoopedExecutionResume {
        prev_state_execution_id: String,
        prev_execution_id: String,
        child_execution_id_to_state_instance_id: BTreeMap<String, String>,
    },
}

impl StageElementKind {
    /// Base category; resume variants report the kind they stand in for
    pub fn category(&self) -> ElementCategory {
        match self {
            Self::Approval | Self::ApprovalResume { .. } => ElementCategory::Approval,
            Self::SingleExecution { .. } | Self::SingleExecutionResume { .. } => {
                ElementCategory::Single
            }
            Self::LoopedExecution { .. } | Self::LoopedExecutionResume { .. } => {
                ElementCategory::Looped
            }
        }
    }

    /// Whether this kind splices in results of a previous execution
    pub fn is_resume(&self) -> bool {
        match self {
            Self::ApprovalResume { .. }
            | Self::SingleExecutionResume { .. }
            | Self::LoopedExecutionResume { .. } => true,
            Self::Approval | Self::SingleExecution { .. } | Self::LoopedExecution { .. } => false,
        }
    }

    /// Kind name as written in definition files
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Approval => "approval",
            Self::SingleExecution { .. } => "single_execution",
            Self::LoopedExecution { .. } => "looped_execution",
            Self::ApprovalResume { .. } => "approval_resume",
            Self::SingleExecutionResume { .. } => "single_execution_resume",
            Self::LoopedExecutionResume { .. } => "looped_execution_resume",
        }
    }

    /// Referenced sub-workflow id, for kinds that run one
    pub fn workflow_id(&self) -> Option<&str> {
        match self {
            Self::SingleExecution { workflow_id } | Self::LoopedExecution { workflow_id, .. } => {
                Some(workflow_id)
            }
            _ => None,
        }
    }
}

/// Structural category shared by a kind and its resume variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementCategory {
    Approval,
    Single,
    Looped,
}

impl std::fmt::Display for ElementCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approval => write!(f, "approval"),
            Self::Single => write!(f, "single execution"),
            Self::Looped => write!(f, "looped execution"),
        }
    }
}
