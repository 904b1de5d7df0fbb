// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Runtime state instances
//!
//! State-machine nodes created during one attempt. They carry the ids a
//! resumed execution needs to reattach to prior results.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::errors::{ResumeError, ResumeResult};

/// A state-machine node created for one stage element occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeStateInstance {
    /// State instance id
    pub id: String,

    /// Data produced by the instance
    pub data: StateData,
}

/// Data produced by a runtime state instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateData {
    /// Approval gate
    Approval,

    /// Single sub-workflow run
    SingleExecution {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sub_execution_id: Option<String>,
    },

    /// Fork point of a looped stage
    FanOut {
        /// Names of the child instances, in fork order
        child_instance_names: Vec<String>,
    },
}

impl StateData {
    /// Short name used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Approval => "approval state data",
            Self::SingleExecution { .. } => "single execution state data",
            Self::FanOut { .. } => "fan-out state data",
        }
    }
}

/// State instances of one attempt, keyed by stage element display name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateInstanceMap {
    instances: HashMap<String, RuntimeStateInstance>,
}

impl StateInstanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load state instances from a JSON file
    pub fn from_file(path: &Path) -> ResumeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ResumeError::FileRead {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse state instances from a JSON object keyed by display name
    pub fn from_json(json: &str) -> ResumeResult<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    /// Instance created for an element, if any
    pub fn get(&self, element_name: &str) -> Option<&RuntimeStateInstance> {
        self.instances.get(element_name)
    }

    /// Instance created for an element, or `MissingStateInstance`
    pub fn require(&self, element_name: &str) -> ResumeResult<&RuntimeStateInstance> {
        self.get(element_name)
            .ok_or_else(|| ResumeError::MissingStateInstance {
                element: element_name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl FromIterator<(String, RuntimeStateInstance)> for StateInstanceMap {
    fn from_iter<I: IntoIterator<Item = (String, RuntimeStateInstance)>>(iter: I) -> Self {
        Self {
            instances: iter.into_iter().collect(),
        }
    }
}
