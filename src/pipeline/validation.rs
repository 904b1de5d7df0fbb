// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Pipeline validation
//!
//! Structural checks a definition must pass before it can be paired with
//! execution history.

use std::collections::HashMap;

use crate::pipeline::{PipelineDefinition, StageElement, StageGroup};

/// Pipeline validator
pub struct PipelineValidator;

impl PipelineValidator {
    /// Validate a pipeline definition
    pub fn validate(pipeline: &PipelineDefinition) -> ValidationResult {
        let mut result = ValidationResult::new();

        if pipeline.stage_groups.is_empty() {
            result.add_error("Pipeline has no stage groups defined");
        }

        Self::validate_element_identity(pipeline, &mut result);

        let mut previous_index = None;
        for group in &pipeline.stage_groups {
            if let Some(prev) = previous_index {
                if group.parallel_index < prev {
                    result.add_error(&format!(
                        "Stage group '{}' has parallel index {} after index {}",
                        group.name, group.parallel_index, prev
                    ));
                }
            }
            previous_index = Some(group.parallel_index);

            Self::validate_group(group, &mut result);
        }

        result
    }

    /// Records are paired by element id, state instances by display name.
    /// An id may repeat only as the sole, identical element of each of its
    /// groups: one group per fan-out branch in a loop-expanded definition.
    fn validate_element_identity(pipeline: &PipelineDefinition, result: &mut ValidationResult) {
        let mut ids: Vec<&str> = Vec::new();
        let mut by_id: HashMap<&str, Vec<(&StageGroup, &StageElement)>> = HashMap::new();
        let mut id_by_name: HashMap<&str, &str> = HashMap::new();

        for group in &pipeline.stage_groups {
            for element in &group.elements {
                let occurrences = by_id.entry(element.id.as_str()).or_default();
                if occurrences.is_empty() {
                    ids.push(element.id.as_str());
                }
                occurrences.push((group, element));

                let id = *id_by_name
                    .entry(element.name.as_str())
                    .or_insert(element.id.as_str());
                if id != element.id {
                    result.add_error(&format!("Duplicate stage element name: '{}'", element.name));
                }
            }
        }

        for id in ids {
            if !Self::is_branch_expansion(&by_id[id]) {
                result.add_error(&format!("Duplicate stage element id: '{}'", id));
            }
        }
    }

    fn is_branch_expansion(occurrences: &[(&StageGroup, &StageElement)]) -> bool {
        match occurrences {
            [] | [_] => true,
            [(_, first), ..] => occurrences
                .iter()
                .all(|(group, element)| group.elements.len() == 1 && element == first),
        }
    }

    /// Validate a single stage group
    fn validate_group(group: &StageGroup, result: &mut ValidationResult) {
        if group.elements.is_empty() {
            result.add_warning(&format!("Stage group '{}' has no elements", group.name));
        }

        for element in &group.elements {
            if element.id.is_empty() {
                result.add_error(&format!(
                    "Stage group '{}': element '{}' has an empty id",
                    group.name, element.name
                ));
            }

            if element.kind.workflow_id().is_some_and(str::is_empty) {
                result.add_error(&format!(
                    "Stage group '{}': element '{}' references an empty workflow id",
                    group.name, element.name
                ));
            }

            if element.kind.is_resume() {
                result.add_warning(&format!(
                    "Stage group '{}': element '{}' is already a resume variant ({})",
                    group.name,
                    element.name,
                    element.kind.type_name()
                ));
            }
        }
    }
}

/// Result of pipeline validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    pub fn add_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
