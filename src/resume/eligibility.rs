// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Resume eligibility checks

use tracing::debug;

use crate::errors::{ResumeError, ResumeResult};
use crate::execution::{ExecutionRecord, ExecutionStatus, WorkflowType};

/// Verify that `execution` may be resumed
///
/// Checks run in a fixed order and the first failure is reported:
/// workflow type, status, chain position, then stage progress.
pub fn check_resumable(execution: &ExecutionRecord) -> ResumeResult<()> {
    check_pipeline_type(execution)?;

    if !execution.status.is_resumable() {
        return Err(ResumeError::InvalidStatus {
            execution_id: execution.id.clone(),
            status: execution.status.to_string(),
            allowed: ExecutionStatus::resumable_list(),
        });
    }

    if let Some(chain_id) = &execution.resume_chain_id {
        if !execution.latest_in_chain {
            return Err(ResumeError::NotLatestInChain {
                execution_id: execution.id.clone(),
                chain_id: chain_id.clone(),
            });
        }
    }

    let progressed = execution
        .stage_executions
        .iter()
        .any(|r| r.status != ExecutionStatus::Queued);
    if !progressed {
        return Err(ResumeError::NoStageProgressed {
            execution_id: execution.id.clone(),
        });
    }

    debug!(execution = %execution.id, status = %execution.status, "execution is resumable");
    Ok(())
}

/// Verify that the resume history of `execution` may be shown
pub fn check_resume_history_visible(execution: &ExecutionRecord) -> ResumeResult<()> {
    check_pipeline_type(execution)
}

fn check_pipeline_type(execution: &ExecutionRecord) -> ResumeResult<()> {
    match execution.workflow_type {
        WorkflowType::Pipeline => Ok(()),
        other => Err(ResumeError::WrongWorkflowType {
            execution_id: execution.id.clone(),
            found: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::StageExecutionRecord;

    fn record(status: ExecutionStatus) -> StageExecutionRecord {
        StageExecutionRecord {
            status,
            stage_element_id: "s1".into(),
            looped: false,
            sub_executions: None,
            approval: None,
        }
    }

    fn execution(status: ExecutionStatus) -> ExecutionRecord {
        ExecutionRecord {
            id: "exec-1".into(),
            name: None,
            pipeline_id: None,
            workflow_type: WorkflowType::Pipeline,
            status,
            created_at: 0,
            stage_executions: vec![record(ExecutionStatus::Success), record(ExecutionStatus::Failed)],
            resume_chain_id: None,
            latest_in_chain: false,
        }
    }

    #[test]
    fn test_failed_execution_is_resumable() {
        assert!(check_resumable(&execution(ExecutionStatus::Failed)).is_ok());
    }

    #[test]
    fn test_running_execution_is_not_resumable() {
        let err = check_resumable(&execution(ExecutionStatus::Running)).unwrap_err();
        assert_eq!(
            err,
            ResumeError::InvalidStatus {
                execution_id: "exec-1".into(),
                status: "RUNNING".into(),
                allowed: "[ABORTED, FAILED, REJECTED, EXPIRED, ERROR]".into(),
            }
        );
        assert!(err.to_string().contains("ABORTED"));
    }

    #[test]
    fn test_every_status_outside_the_allowed_set_is_rejected() {
        let all = [
            ExecutionStatus::Success,
            ExecutionStatus::Failed,
            ExecutionStatus::Skipped,
            ExecutionStatus::Queued,
            ExecutionStatus::Running,
            ExecutionStatus::Waiting,
            ExecutionStatus::Aborted,
            ExecutionStatus::Expired,
            ExecutionStatus::Rejected,
            ExecutionStatus::Error,
        ];
        for status in all {
            let result = check_resumable(&execution(status));
            assert_eq!(result.is_ok(), status.is_resumable(), "status {}", status);
        }
    }

    #[test]
    fn test_workflow_execution_is_rejected_first() {
        let mut workflow = execution(ExecutionStatus::Running);
        workflow.workflow_type = WorkflowType::Workflow;

        assert!(matches!(
            check_resumable(&workflow).unwrap_err(),
            ResumeError::WrongWorkflowType { .. }
        ));
        assert!(matches!(
            check_resume_history_visible(&workflow).unwrap_err(),
            ResumeError::WrongWorkflowType { .. }
        ));
    }

    #[test]
    fn test_superseded_attempt() {
        let mut superseded = execution(ExecutionStatus::Failed);
        superseded.resume_chain_id = Some("exec-0".into());
        superseded.latest_in_chain = false;

        assert_eq!(
            check_resumable(&superseded).unwrap_err(),
            ResumeError::NotLatestInChain {
                execution_id: "exec-1".into(),
                chain_id: "exec-0".into(),
            }
        );

        superseded.latest_in_chain = true;
        assert!(check_resumable(&superseded).is_ok());
    }

    #[test]
    fn test_no_stage_progressed() {
        let mut queued = execution(ExecutionStatus::Aborted);
        queued.stage_executions = vec![record(ExecutionStatus::Queued), record(ExecutionStatus::Queued)];
        assert!(matches!(
            check_resumable(&queued).unwrap_err(),
            ResumeError::NoStageProgressed { .. }
        ));

        queued.stage_executions.clear();
        assert!(matches!(
            check_resumable(&queued).unwrap_err(),
            ResumeError::NoStageProgressed { .. }
        ));
    }

    #[test]
    fn test_history_ignores_status_and_chain() {
        let mut running = execution(ExecutionStatus::Running);
        running.resume_chain_id = Some("exec-0".into());
        running.stage_executions.clear();
        assert!(check_resume_history_visible(&running).is_ok());
    }

    #[test]
    fn test_eligibility_depends_only_on_checked_fields() {
        let mut base = execution(ExecutionStatus::Error);
        let before = check_resumable(&base).is_ok();
        base.name = Some("renamed".into());
        base.created_at = 42;
        base.pipeline_id = Some("other".into());
        assert_eq!(check_resumable(&base).is_ok(), before);
    }
}
