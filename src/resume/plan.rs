// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Resume plan construction
//!
//! Rewrites every stage element before the resume point into a resume variant
//! that references the previous attempt, and leaves the rest of the pipeline
//! to execute fresh.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::matcher::{ElementMatch, PairingMode, RecordCursor, StageExecutionMatcher};
use crate::errors::{ResumeError, ResumeResult};
use crate::execution::{ExecutionRecord, StateData, StateInstanceMap};
use crate::pipeline::{ElementCategory, PipelineDefinition, StageElement, StageElementKind, StageGroup};

/// A pipeline definition ready to resume a previous execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumePlan {
    /// Groups below this parallel index reuse prior results
    pub resume_parallel_index: u32,

    /// Execution whose results are reused
    pub source_execution_id: String,

    /// The synthesized definition
    pub pipeline: PipelineDefinition,
}

impl ResumePlan {
    /// Number of groups made of resume variants
    pub fn resumed_group_count(&self) -> usize {
        self.pipeline
            .stage_groups
            .iter()
            .filter(|g| g.parallel_index < self.resume_parallel_index)
            .count()
    }

    /// Number of groups that will execute fresh
    pub fn fresh_group_count(&self) -> usize {
        self.pipeline.stage_groups.len() - self.resumed_group_count()
    }

    /// Consume the plan, keeping only the definition
    pub fn into_pipeline(self) -> PipelineDefinition {
        self.pipeline
    }
}

/// Resume plan builder
pub struct ResumePlanBuilder<'a> {
    execution: &'a ExecutionRecord,
    states: &'a StateInstanceMap,
}

impl<'a> ResumePlanBuilder<'a> {
    /// Create a builder reusing results of `execution`
    pub fn new(execution: &'a ExecutionRecord, states: &'a StateInstanceMap) -> Self {
        Self { execution, states }
    }

    /// Build a plan resuming `pipeline` at `resume_parallel_index`
    pub fn build(
        &self,
        pipeline: &PipelineDefinition,
        resume_parallel_index: u32,
    ) -> ResumeResult<ResumePlan> {
        if pipeline.stage_groups.is_empty() {
            return Err(ResumeError::invalid_pipeline(format!(
                "pipeline '{}' has no stage groups",
                pipeline.name
            )));
        }
        if self.execution.stage_executions.is_empty() {
            return Err(ResumeError::NoExecutionHistory {
                execution_id: self.execution.id.clone(),
            });
        }
        Self::check_phase_order(pipeline)?;

        let mut cursor = RecordCursor::new(&self.execution.stage_executions);
        let mut stage_groups = Vec::with_capacity(pipeline.stage_groups.len());

        for group in &pipeline.stage_groups {
            if group.parallel_index >= resume_parallel_index {
                stage_groups.push(group.clone());
                continue;
            }

            let pairing = StageExecutionMatcher::match_group(group, &mut cursor, PairingMode::Expanded)?;
            let elements = pairing
                .matches
                .iter()
                .map(|m| self.rewrite(m))
                .collect::<ResumeResult<Vec<_>>>()?;

            stage_groups.push(StageGroup {
                name: group.name.clone(),
                parallel_index: group.parallel_index,
                elements,
            });
        }

        let plan = ResumePlan {
            resume_parallel_index,
            source_execution_id: self.execution.id.clone(),
            pipeline: PipelineDefinition {
                stage_groups,
                ..pipeline.clone()
            },
        };

        info!(
            execution = %self.execution.id,
            resume_parallel_index,
            resumed_groups = plan.resumed_group_count(),
            fresh_groups = plan.fresh_group_count(),
            "built resume plan"
        );

        Ok(plan)
    }

    /// Positional pairing only works when phases appear in index order
    fn check_phase_order(pipeline: &PipelineDefinition) -> ResumeResult<()> {
        for pair in pipeline.stage_groups.windows(2) {
            if pair[1].parallel_index < pair[0].parallel_index {
                return Err(ResumeError::invalid_pipeline(format!(
                    "stage group '{}' (parallel index {}) follows '{}' (parallel index {})",
                    pair[1].name, pair[1].parallel_index, pair[0].name, pair[0].parallel_index
                )));
            }
        }
        Ok(())
    }

    /// Rewrite one matched element into its resume variant
    fn rewrite(&self, matched: &ElementMatch<'_>) -> ResumeResult<StageElement> {
        let element = matched.element;
        let instance = self.states.require(&element.name)?;
        let prev_state_execution_id = instance.id.clone();
        let prev_execution_id = self.execution.id.clone();

        let kind = match element.category() {
            ElementCategory::Approval => {
                self.expect_data(matched, &instance.data, |d| matches!(d, StateData::Approval), "approval state data")?;
                StageElementKind::ApprovalResume {
                    prev_state_execution_id,
                    prev_execution_id,
                }
            }
            ElementCategory::Single => {
                self.expect_data(
                    matched,
                    &instance.data,
                    |d| matches!(d, StateData::SingleExecution { .. }),
                    "single execution state data",
                )?;
                StageElementKind::SingleExecutionResume {
                    prev_state_execution_id,
                    prev_execution_id,
                    prev_sub_execution_ids: matched.sub_execution_ids(),
                }
            }
            ElementCategory::Looped => StageElementKind::LoopedExecutionResume {
                prev_state_execution_id,
                prev_execution_id,
                child_execution_id_to_state_instance_id: self.child_instance_map(
                    matched,
                    &instance.data,
                )?,
            },
        };

        debug!(
            element = %element.name,
            kind = kind.type_name(),
            "rewrote stage element"
        );

        Ok(StageElement {
            id: element.id.clone(),
            name: element.name.clone(),
            kind,
        })
    }

    /// Check the state instance agrees with the element; skipped elements may
    /// never have produced their data
    fn expect_data(
        &self,
        matched: &ElementMatch<'_>,
        data: &StateData,
        accepts: impl Fn(&StateData) -> bool,
        expected: &str,
    ) -> ResumeResult<()> {
        if accepts(data) || matched.all_skipped() {
            return Ok(());
        }
        Err(ResumeError::type_mismatch(
            &matched.element.name,
            expected,
            data.describe(),
        ))
    }

    /// Map each child sub-execution to the state instance of its fan-out branch
    fn child_instance_map(
        &self,
        matched: &ElementMatch<'_>,
        data: &StateData,
    ) -> ResumeResult<BTreeMap<String, String>> {
        let stage = &matched.element.name;
        let child_names = match data {
            StateData::FanOut {
                child_instance_names,
            } => child_instance_names,
            _ if matched.all_skipped() => return Ok(BTreeMap::new()),
            other => {
                return Err(ResumeError::type_mismatch(
                    stage,
                    "fan-out state data",
                    other.describe(),
                ))
            }
        };

        let sub_execution_ids = matched.sub_execution_ids();
        if child_names.len() != sub_execution_ids.len() {
            return Err(ResumeError::type_mismatch(
                stage,
                format!("{} fan-out branch execution(s)", child_names.len()),
                format!("{} child sub-execution(s)", sub_execution_ids.len()),
            ));
        }

        let mut map = BTreeMap::new();
        for (child_name, sub_execution_id) in child_names.iter().zip(sub_execution_ids) {
            let child = self.states.require(child_name)?;
            if map.insert(sub_execution_id.clone(), child.id.clone()).is_some() {
                return Err(ResumeError::type_mismatch(
                    stage,
                    "distinct child sub-executions",
                    format!("sub-execution '{}' twice", sub_execution_id),
                ));
            }
        }

        Ok(map)
    }
}

/// Build a resume plan for `pipeline`, reusing results of `execution` for
/// every group below `resume_parallel_index`
pub fn build_resume_plan(
    pipeline: &PipelineDefinition,
    resume_parallel_index: u32,
    execution: &ExecutionRecord,
    states: &StateInstanceMap,
) -> ResumeResult<ResumePlan> {
    ResumePlanBuilder::new(execution, states).build(pipeline, resume_parallel_index)
}
