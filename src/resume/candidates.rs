// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Resume candidate listing

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::matcher::{PairingMode, RecordCursor, StageExecutionMatcher};
use crate::errors::{ResumeError, ResumeResult};
use crate::execution::ExecutionRecord;
use crate::pipeline::{PipelineDefinition, StageGroup};

/// A phase of a previous execution that a resume may start from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageGroupSummary {
    /// Name of the first group of the phase
    pub name: String,

    /// Parallel index shared by the phase
    pub parallel_index: u32,

    /// Display names of every element in the phase
    pub element_names: Vec<String>,
}

impl StageGroupSummary {
    fn from_phase(phase: &[StageGroup]) -> Option<Self> {
        let first = phase.first()?;
        Some(Self {
            name: first.name.clone(),
            parallel_index: first.parallel_index,
            element_names: phase
                .iter()
                .flat_map(|g| &g.elements)
                .map(|e| e.display_name().to_string())
                .collect(),
        })
    }
}

/// List the phases of `pipeline` that `execution` reached
pub fn list_resume_candidates(
    pipeline: &PipelineDefinition,
    execution: &ExecutionRecord,
) -> ResumeResult<Vec<StageGroupSummary>> {
    if pipeline.stage_groups.is_empty() {
        return Err(ResumeError::invalid_pipeline(format!(
            "pipeline '{}' has no stage groups",
            pipeline.name
        )));
    }
    if execution.stage_executions.is_empty() {
        return Err(ResumeError::NoExecutionHistory {
            execution_id: execution.id.clone(),
        });
    }

    let mut cursor = RecordCursor::new(&execution.stage_executions);
    let mut candidates = Vec::new();

    for phase in pipeline
        .stage_groups
        .chunk_by(|a, b| a.parallel_index == b.parallel_index)
    {
        if cursor.is_exhausted() {
            break;
        }

        for group in phase {
            StageExecutionMatcher::match_group(group, &mut cursor, PairingMode::Flat)?;
        }

        if let Some(summary) = StageGroupSummary::from_phase(phase) {
            candidates.push(summary);
        }
    }

    debug!(
        execution = %execution.id,
        candidates = candidates.len(),
        unpaired_records = cursor.remaining_len(),
        "listed resume candidates"
    );

    Ok(candidates)
}

/// Parallel index of the group named `stage_name`, or of the group holding an
/// element with that display name
pub fn parallel_index_of(stage_name: &str, pipeline: &PipelineDefinition) -> ResumeResult<u32> {
    pipeline
        .get_group(stage_name)
        .or_else(|| {
            pipeline
                .stage_groups
                .iter()
                .find(|g| g.elements.iter().any(|e| e.name == stage_name))
        })
        .map(|g| g.parallel_index)
        .ok_or_else(|| ResumeError::StageNotFound {
            stage: stage_name.to_string(),
        })
}

/// Resolve `stage_name` to a parallel index `execution` can be resumed from
pub fn resolve_resume_point(
    pipeline: &PipelineDefinition,
    execution: &ExecutionRecord,
    stage_name: &str,
) -> ResumeResult<u32> {
    let index = parallel_index_of(stage_name, pipeline)?;
    let candidates = list_resume_candidates(pipeline, execution)?;

    if candidates.iter().any(|c| c.parallel_index == index) {
        Ok(index)
    } else {
        Err(ResumeError::StageNotFound {
            stage: stage_name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{
        ApprovalMarker, ExecutionStatus, StageExecutionRecord, SubExecutionRef, WorkflowType,
    };
    use crate::pipeline::{StageElement, StageElementKind};

    fn element(id: &str, name: &str, kind: StageElementKind) -> StageElement {
        StageElement {
            id: id.into(),
            name: name.into(),
            kind,
        }
    }

    fn single(id: &str) -> StageElement {
        element(
            id,
            id,
            StageElementKind::SingleExecution {
                workflow_id: "wf".into(),
            },
        )
    }

    fn group(name: &str, index: u32, elements: Vec<StageElement>) -> StageGroup {
        StageGroup {
            name: name.into(),
            parallel_index: index,
            elements,
        }
    }

    fn pipeline(groups: Vec<StageGroup>) -> PipelineDefinition {
        PipelineDefinition {
            version: "1".into(),
            name: "release".into(),
            description: None,
            stage_groups: groups,
        }
    }

    fn run(id: &str, status: ExecutionStatus) -> StageExecutionRecord {
        StageExecutionRecord {
            status,
            stage_element_id: id.into(),
            looped: false,
            sub_executions: Some(vec![SubExecutionRef {
                id: format!("wx-{}", id),
                name: id.into(),
                workflow_id: "wf".into(),
            }]),
            approval: None,
        }
    }

    fn approved(id: &str) -> StageExecutionRecord {
        StageExecutionRecord {
            status: ExecutionStatus::Success,
            stage_element_id: id.into(),
            looped: false,
            sub_executions: None,
            approval: Some(ApprovalMarker::default()),
        }
    }

    fn skipped(id: &str) -> StageExecutionRecord {
        StageExecutionRecord {
            status: ExecutionStatus::Skipped,
            stage_element_id: id.into(),
            looped: false,
            sub_executions: None,
            approval: None,
        }
    }

    fn execution(records: Vec<StageExecutionRecord>) -> ExecutionRecord {
        ExecutionRecord {
            id: "exec-1".into(),
            name: None,
            pipeline_id: None,
            workflow_type: WorkflowType::Pipeline,
            status: ExecutionStatus::Failed,
            created_at: 0,
            stage_executions: records,
            resume_chain_id: None,
            latest_in_chain: false,
        }
    }

    fn four_stage_pipeline() -> PipelineDefinition {
        pipeline(vec![
            group(
                "gate",
                1,
                vec![element("a1", "Sign-off", StageElementKind::Approval)],
            ),
            group("build", 2, vec![single("build")]),
            group("test", 3, vec![single("test")]),
            group("deploy", 4, vec![single("deploy")]),
        ])
    }

    #[test]
    fn test_candidates_stop_at_first_unattempted_group() {
        let pipeline = four_stage_pipeline();
        let execution = execution(vec![
            approved("a1"),
            run("build", ExecutionStatus::Success),
            run("test", ExecutionStatus::Failed),
        ]);

        let candidates = list_resume_candidates(&pipeline, &execution).unwrap();
        assert_eq!(candidates.len(), 3);
        assert_eq!(
            candidates[0],
            StageGroupSummary {
                name: "gate".into(),
                parallel_index: 1,
                element_names: vec!["Approval".into()],
            }
        );
        assert_eq!(candidates[1].name, "build");
        assert_eq!(candidates[2].name, "test");
        assert_eq!(candidates[2].element_names, vec!["test".to_string()]);
    }

    #[test]
    fn test_skipped_groups_are_candidates() {
        let pipeline = four_stage_pipeline();
        let execution = execution(vec![
            approved("a1"),
            skipped("build"),
            run("test", ExecutionStatus::Failed),
        ]);

        let candidates = list_resume_candidates(&pipeline, &execution).unwrap();
        let names: Vec<_> = candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["gate", "build", "test"]);
    }

    #[test]
    fn test_skipped_then_succeeded_then_unattempted() {
        let pipeline = pipeline(vec![
            group("build", 1, vec![single("build")]),
            group("test", 2, vec![single("test")]),
            group("deploy", 3, vec![single("deploy")]),
        ]);
        let execution = execution(vec![skipped("build"), run("test", ExecutionStatus::Success)]);

        let candidates = list_resume_candidates(&pipeline, &execution).unwrap();
        let indices: Vec<_> = candidates.iter().map(|c| c.parallel_index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(candidates[0].element_names, vec!["build".to_string()]);
        assert_eq!(candidates[1].element_names, vec!["test".to_string()]);
    }

    #[test]
    fn test_parallel_groups_form_one_candidate() {
        let pipeline = pipeline(vec![
            group("build", 1, vec![single("build")]),
            group("lint", 2, vec![single("lint")]),
            group("unit", 2, vec![single("unit")]),
            group("deploy", 3, vec![single("deploy")]),
        ]);
        let execution = execution(vec![
            run("build", ExecutionStatus::Success),
            run("lint", ExecutionStatus::Success),
            run("unit", ExecutionStatus::Failed),
        ]);

        let candidates = list_resume_candidates(&pipeline, &execution).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(
            candidates[1],
            StageGroupSummary {
                name: "lint".into(),
                parallel_index: 2,
                element_names: vec!["lint".into(), "unit".into()],
            }
        );
    }

    #[test]
    fn test_history_ending_inside_a_phase() {
        let pipeline = pipeline(vec![
            group("lint", 1, vec![single("lint")]),
            group("unit", 1, vec![single("unit")]),
        ]);
        let execution = execution(vec![run("lint", ExecutionStatus::Failed)]);

        let err = list_resume_candidates(&pipeline, &execution).unwrap_err();
        assert_eq!(
            err,
            ResumeError::InsufficientStageExecutions {
                stage: "unit".into(),
                required: 1,
                available: 0,
            }
        );
    }

    #[test]
    fn test_kind_mismatch() {
        let pipeline = four_stage_pipeline();
        let execution = execution(vec![run("a1", ExecutionStatus::Success)]);

        let err = list_resume_candidates(&pipeline, &execution).unwrap_err();
        assert!(matches!(err, ResumeError::StageTypeMismatch { .. }));
    }

    #[test]
    fn test_empty_inputs() {
        let empty = pipeline(vec![]);
        let err = list_resume_candidates(&empty, &execution(vec![approved("a1")])).unwrap_err();
        assert!(matches!(err, ResumeError::InvalidPipeline { .. }));

        let err = list_resume_candidates(&four_stage_pipeline(), &execution(vec![])).unwrap_err();
        assert!(matches!(err, ResumeError::NoExecutionHistory { .. }));
    }

    #[test]
    fn test_looped_expanded_definition() {
        let pipeline = pipeline(vec![
            group("regions_1", 1, vec![single("regions")]),
            group("regions_2", 2, vec![single("regions")]),
            group("verify", 3, vec![single("verify")]),
        ]);
        let mut first = run("regions", ExecutionStatus::Success);
        first.looped = true;
        let mut second = run("regions", ExecutionStatus::Failed);
        second.looped = true;

        let candidates = list_resume_candidates(&pipeline, &execution(vec![first, second])).unwrap();
        let indices: Vec<_> = candidates.iter().map(|c| c.parallel_index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_parallel_index_of() {
        let pipeline = four_stage_pipeline();
        assert_eq!(parallel_index_of("test", &pipeline).unwrap(), 3);
        assert_eq!(parallel_index_of("Sign-off", &pipeline).unwrap(), 1);
        assert_eq!(
            parallel_index_of("missing", &pipeline).unwrap_err(),
            ResumeError::StageNotFound {
                stage: "missing".into()
            }
        );
    }

    #[test]
    fn test_resolve_resume_point() {
        let pipeline = four_stage_pipeline();
        let execution = execution(vec![
            approved("a1"),
            run("build", ExecutionStatus::Success),
            run("test", ExecutionStatus::Failed),
        ]);

        assert_eq!(resolve_resume_point(&pipeline, &execution, "test").unwrap(), 3);
        assert!(matches!(
            resolve_resume_point(&pipeline, &execution, "deploy").unwrap_err(),
            ResumeError::StageNotFound { .. }
        ));
    }
}
