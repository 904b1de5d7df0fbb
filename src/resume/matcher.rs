// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Stage execution matching
//!
//! Pairs the stage elements of a group with the stage execution records that
//! ran them. Records carry no link back to their group: ownership follows
//! from list order alone, so pairing consumes records off the front of a
//! [`RecordCursor`].

use tracing::debug;

use crate::errors::{ResumeError, ResumeResult};
use crate::execution::{ExecutionStatus, StageExecutionRecord};
use crate::pipeline::{ElementCategory, StageElement, StageGroup};

/// How looped elements claim records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairingMode {
    /// A looped element claims every consecutive looped record with its id
    #[default]
    Expanded,
    /// Every element claims exactly one record and the looped flag is not
    /// enforced (definitions with fan-outs pre-expanded into groups)
    Flat,
}

/// Read position in a list of stage execution records
#[derive(Debug, Clone)]
pub struct RecordCursor<'a> {
    records: &'a [StageExecutionRecord],
    position: usize,
}

impl<'a> RecordCursor<'a> {
    pub fn new(records: &'a [StageExecutionRecord]) -> Self {
        Self {
            records,
            position: 0,
        }
    }

    /// Records not yet consumed
    pub fn remaining(&self) -> &'a [StageExecutionRecord] {
        &self.records[self.position..]
    }

    pub fn remaining_len(&self) -> usize {
        self.records.len() - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.records.len()
    }

    /// Number of records consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    fn take(&mut self, count: usize) -> &'a [StageExecutionRecord] {
        let end = (self.position + count).min(self.records.len());
        let taken = &self.records[self.position..end];
        self.position = end;
        taken
    }
}

/// A stage element and the records it owns
#[derive(Debug, Clone)]
pub struct ElementMatch<'a> {
    pub element: &'a StageElement,
    pub records: &'a [StageExecutionRecord],
}

impl ElementMatch<'_> {
    /// Whether every owned record was skipped
    pub fn all_skipped(&self) -> bool {
        self.records
            .iter()
            .all(|r| r.status == ExecutionStatus::Skipped)
    }

    /// Child sub-execution ids across all owned records, in record order
    pub fn sub_execution_ids(&self) -> Vec<String> {
        self.records
            .iter()
            .flat_map(|r| r.sub_execution_ids())
            .map(str::to_string)
            .collect()
    }
}

/// A stage group whose elements were paired with compatible records
#[derive(Debug, Clone)]
pub struct ValidatedPairing<'a> {
    pub group: &'a StageGroup,
    pub matches: Vec<ElementMatch<'a>>,
}

impl ValidatedPairing<'_> {
    /// Number of records this group consumed
    pub fn consumed(&self) -> usize {
        self.matches.iter().map(|m| m.records.len()).sum()
    }
}

/// Stage execution matcher
pub struct StageExecutionMatcher;

impl StageExecutionMatcher {
    /// Pair a group with the records at the front of `records`
    pub fn pair<'a>(
        group: &'a StageGroup,
        records: &'a [StageExecutionRecord],
        mode: PairingMode,
    ) -> ResumeResult<ValidatedPairing<'a>> {
        let mut cursor = RecordCursor::new(records);
        Self::match_group(group, &mut cursor, mode)
    }

    /// Pair a group with the next records of `cursor`, advancing it past them
    pub fn match_group<'a>(
        group: &'a StageGroup,
        cursor: &mut RecordCursor<'a>,
        mode: PairingMode,
    ) -> ResumeResult<ValidatedPairing<'a>> {
        let required = Self::required_count(group, cursor.remaining(), mode);
        let available = cursor.remaining_len();
        if required > available {
            return Err(ResumeError::InsufficientStageExecutions {
                stage: group.name.clone(),
                required,
                available,
            });
        }

        let mut matches = Vec::with_capacity(group.elements.len());
        for element in &group.elements {
            let span = Self::span_len(element, cursor.remaining(), mode);
            let records = cursor.take(span);
            Self::check_element(element, records, mode)?;
            matches.push(ElementMatch { element, records });
        }

        debug!(
            group = %group.name,
            parallel_index = group.parallel_index,
            consumed = required,
            "paired stage group with execution records"
        );

        Ok(ValidatedPairing { group, matches })
    }

    /// Number of records a group needs from the front of `records`
    pub fn required_count(
        group: &StageGroup,
        records: &[StageExecutionRecord],
        mode: PairingMode,
    ) -> usize {
        let mut offset = 0;
        for element in &group.elements {
            let rest = &records[offset.min(records.len())..];
            offset += Self::span_len(element, rest, mode);
        }
        offset
    }

    /// Number of records one element claims from the front of `records`
    fn span_len(element: &StageElement, records: &[StageExecutionRecord], mode: PairingMode) -> usize {
        match (element.category(), mode) {
            (ElementCategory::Looped, PairingMode::Expanded) => records
                .iter()
                .take_while(|r| r.looped && r.stage_element_id == element.id)
                .count()
                .max(1),
            _ => 1,
        }
    }

    /// Verify that every record is structurally compatible with the element
    fn check_element(
        element: &StageElement,
        records: &[StageExecutionRecord],
        mode: PairingMode,
    ) -> ResumeResult<()> {
        let category = element.category();

        for record in records {
            if mode == PairingMode::Expanded {
                match category {
                    ElementCategory::Looped if !record.looped => {
                        return Err(ResumeError::type_mismatch(
                            &element.name,
                            "looped records",
                            record.content_summary(),
                        ));
                    }
                    ElementCategory::Approval | ElementCategory::Single if record.looped => {
                        return Err(ResumeError::type_mismatch(
                            &element.name,
                            format!("an unlooped {} record", category),
                            record.content_summary(),
                        ));
                    }
                    _ => {}
                }
            }

            if Self::exempt_from_content_check(record) {
                continue;
            }

            let compatible = match category {
                ElementCategory::Approval => record.has_approval() && !record.has_sub_executions(),
                ElementCategory::Single | ElementCategory::Looped => {
                    record.has_sub_executions() && !record.has_approval()
                }
            };

            if !compatible {
                let expected = match category {
                    ElementCategory::Approval => "approval data",
                    ElementCategory::Single | ElementCategory::Looped => "sub-executions",
                };
                return Err(ResumeError::type_mismatch(
                    &element.name,
                    expected,
                    record.content_summary(),
                ));
            }
        }

        Ok(())
    }

    /// Skipped stages, and stages that failed before creating anything, carry no content
    fn exempt_from_content_check(record: &StageExecutionRecord) -> bool {
        if record.status == ExecutionStatus::Skipped {
            return true;
        }

        !record.has_sub_executions() && !record.has_approval() && record.status.is_resumable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{ApprovalMarker, SubExecutionRef};
    use crate::pipeline::StageElementKind;

    fn approval(id: &str) -> StageElement {
        StageElement {
            id: id.into(),
            name: format!("{}-name", id),
            kind: StageElementKind::Approval,
        }
    }

    fn single(id: &str, workflow_id: &str) -> StageElement {
        StageElement {
            id: id.into(),
            name: format!("{}-name", id),
            kind: StageElementKind::SingleExecution {
                workflow_id: workflow_id.into(),
            },
        }
    }

    fn looped(id: &str) -> StageElement {
        StageElement {
            id: id.into(),
            name: format!("{}-name", id),
            kind: StageElementKind::LoopedExecution {
                workflow_id: "wf".into(),
                loop_over: None,
            },
        }
    }

    fn group(elements: Vec<StageElement>) -> StageGroup {
        StageGroup {
            name: "group".into(),
            parallel_index: 1,
            elements,
        }
    }

    fn approval_record(id: &str, status: ExecutionStatus) -> StageExecutionRecord {
        StageExecutionRecord {
            status,
            stage_element_id: id.into(),
            looped: false,
            sub_executions: None,
            approval: Some(ApprovalMarker::default()),
        }
    }

    fn workflow_record(id: &str, sub_id: &str, workflow_id: &str) -> StageExecutionRecord {
        StageExecutionRecord {
            status: ExecutionStatus::Success,
            stage_element_id: id.into(),
            looped: false,
            sub_executions: Some(vec![SubExecutionRef {
                id: sub_id.into(),
                name: sub_id.into(),
                workflow_id: workflow_id.into(),
            }]),
            approval: None,
        }
    }

    fn looped_record(id: &str, sub_id: &str) -> StageExecutionRecord {
        StageExecutionRecord {
            looped: true,
            ..workflow_record(id, sub_id, "wf")
        }
    }

    fn empty_record(id: &str, status: ExecutionStatus) -> StageExecutionRecord {
        StageExecutionRecord {
            status,
            stage_element_id: id.into(),
            looped: false,
            sub_executions: None,
            approval: None,
        }
    }

    #[test]
    fn test_pair_mixed_group() {
        let group = group(vec![single("e1", "wf1"), approval("e2"), single("e3", "wf2")]);
        let records = vec![
            workflow_record("e1", "wx1", "wf1"),
            approval_record("e2", ExecutionStatus::Success),
            workflow_record("e3", "wx2", "wf2"),
        ];

        let pairing = StageExecutionMatcher::pair(&group, &records, PairingMode::Expanded).unwrap();
        assert_eq!(pairing.matches.len(), 3);
        assert_eq!(pairing.consumed(), 3);
        assert_eq!(pairing.matches[2].sub_execution_ids(), vec!["wx2"]);
    }

    #[test]
    fn test_approval_against_sub_executions_is_mismatch() {
        let group = group(vec![approval("e1")]);
        let records = vec![workflow_record("e1", "wx1", "wf1")];

        let err = StageExecutionMatcher::pair(&group, &records, PairingMode::Expanded).unwrap_err();
        match err {
            ResumeError::StageTypeMismatch {
                stage, expected, ..
            } => {
                assert_eq!(stage, "e1-name");
                assert_eq!(expected, "approval data");
            }
            other => panic!("Expected StageTypeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_workflow_against_approval_is_mismatch() {
        let group = group(vec![single("e1", "wf1")]);
        let records = vec![approval_record("e1", ExecutionStatus::Success)];

        let err = StageExecutionMatcher::pair(&group, &records, PairingMode::Expanded).unwrap_err();
        assert!(matches!(err, ResumeError::StageTypeMismatch { .. }));
    }

    #[test]
    fn test_insufficient_records() {
        let group = group(vec![single("e1", "wf1"), single("e2", "wf2")]);
        let records = vec![workflow_record("e1", "wx1", "wf1")];

        let err = StageExecutionMatcher::pair(&group, &records, PairingMode::Expanded).unwrap_err();
        assert_eq!(
            err,
            ResumeError::InsufficientStageExecutions {
                stage: "group".into(),
                required: 2,
                available: 1,
            }
        );
    }

    #[test]
    fn test_different_workflow_ids_are_not_checked() {
        let group = group(vec![single("e1", "wf1")]);
        let records = vec![workflow_record("e1", "wx1", "wf-rebound")];

        assert!(StageExecutionMatcher::pair(&group, &records, PairingMode::Expanded).is_ok());
    }

    #[test]
    fn test_skipped_record_consumes_slot_without_content() {
        let group = group(vec![approval("e1"), single("e2", "wf2")]);
        let records = vec![
            empty_record("e1", ExecutionStatus::Skipped),
            empty_record("e2", ExecutionStatus::Skipped),
        ];

        let pairing = StageExecutionMatcher::pair(&group, &records, PairingMode::Expanded).unwrap();
        assert_eq!(pairing.consumed(), 2);
        assert!(pairing.matches.iter().all(|m| m.all_skipped()));
    }

    #[test]
    fn test_records_without_content() {
        let group = group(vec![single("e1", "wf1")]);

        // Failed before the child workflow was created
        for status in ExecutionStatus::RESUMABLE {
            let records = vec![empty_record("e1", status)];
            assert!(StageExecutionMatcher::pair(&group, &records, PairingMode::Expanded).is_ok());
        }

        for status in [
            ExecutionStatus::Success,
            ExecutionStatus::Running,
            ExecutionStatus::Waiting,
            ExecutionStatus::Queued,
        ] {
            let records = vec![empty_record("e1", status)];
            assert!(
                StageExecutionMatcher::pair(&group, &records, PairingMode::Expanded).is_err(),
                "status {} should not pass without content",
                status
            );
        }
    }

    #[test]
    fn test_looped_element_claims_consecutive_records() {
        let group = group(vec![looped("e1"), single("e2", "wf2")]);
        let records = vec![
            looped_record("e1", "wx1"),
            looped_record("e1", "wx2"),
            looped_record("e1", "wx3"),
            workflow_record("e2", "wx4", "wf2"),
        ];

        let pairing = StageExecutionMatcher::pair(&group, &records, PairingMode::Expanded).unwrap();
        assert_eq!(pairing.consumed(), 4);
        assert_eq!(pairing.matches[0].records.len(), 3);
        assert_eq!(pairing.matches[0].sub_execution_ids(), vec!["wx1", "wx2", "wx3"]);
        assert_eq!(pairing.matches[1].sub_execution_ids(), vec!["wx4"]);
    }

    #[test]
    fn test_looped_element_against_unlooped_record_is_mismatch() {
        let group = group(vec![looped("e1")]);
        let records = vec![
            workflow_record("e1", "wx1", "wf"),
            workflow_record("e1", "wx2", "wf"),
        ];

        let err = StageExecutionMatcher::pair(&group, &records, PairingMode::Expanded).unwrap_err();
        assert!(matches!(err, ResumeError::StageTypeMismatch { .. }));
    }

    #[test]
    fn test_single_element_against_looped_record() {
        let group = group(vec![single("e1", "wf1")]);
        let records = vec![looped_record("e1", "wx1"), workflow_record("e1", "wx2", "wf1")];

        let err = StageExecutionMatcher::pair(&group, &records, PairingMode::Expanded).unwrap_err();
        assert!(matches!(err, ResumeError::StageTypeMismatch { .. }));

        // Expanded definitions pair each fan-out branch on its own
        let pairing = StageExecutionMatcher::pair(&group, &records, PairingMode::Flat).unwrap();
        assert_eq!(pairing.consumed(), 1);
    }

    #[test]
    fn test_flat_mode_claims_one_record_per_looped_element() {
        let group = group(vec![looped("e1")]);
        let records = vec![looped_record("e1", "wx1"), looped_record("e1", "wx2")];

        let pairing = StageExecutionMatcher::pair(&group, &records, PairingMode::Flat).unwrap();
        assert_eq!(pairing.consumed(), 1);
    }

    #[test]
    fn test_cursor_advances_across_groups() {
        let first = group(vec![approval("e1")]);
        let second = group(vec![single("e2", "wf2")]);
        let records = vec![
            approval_record("e1", ExecutionStatus::Success),
            workflow_record("e2", "wx2", "wf2"),
        ];

        let mut cursor = RecordCursor::new(&records);
        StageExecutionMatcher::match_group(&first, &mut cursor, PairingMode::Expanded).unwrap();
        assert_eq!(cursor.position(), 1);
        let pairing =
            StageExecutionMatcher::match_group(&second, &mut cursor, PairingMode::Expanded).unwrap();
        assert_eq!(pairing.matches[0].records[0].stage_element_id, "e2");
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_required_count() {
        let group = group(vec![looped("e1"), approval("e2")]);
        let records = vec![looped_record("e1", "wx1"), looped_record("e1", "wx2")];

        assert_eq!(
            StageExecutionMatcher::required_count(&group, &records, PairingMode::Expanded),
            3
        );
        assert_eq!(
            StageExecutionMatcher::required_count(&group, &records, PairingMode::Flat),
            2
        );
    }
}
