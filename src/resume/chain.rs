// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Resume chain tracking
//!
//! Successive attempts of one logical run share a chain id: the id of the
//! first attempt. Exactly one member of a chain is marked latest.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::errors::{ResumeError, ResumeResult};
use crate::execution::ExecutionRecord;
use crate::store::ExecutionStore;

/// Record field a filter can test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    ResumeChainId,
    LatestInChain,
    PipelineId,
}

impl FilterField {
    fn value_of(&self, record: &ExecutionRecord) -> Option<FilterValue> {
        match self {
            Self::ResumeChainId => record.resume_chain_id.clone().map(FilterValue::Text),
            Self::LatestInChain => Some(FilterValue::Bool(record.latest_in_chain)),
            Self::PipelineId => record.pipeline_id.clone().map(FilterValue::Text),
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResumeChainId => write!(f, "resume_chain_id"),
            Self::LatestInChain => write!(f, "latest_in_chain"),
            Self::PipelineId => write!(f, "pipeline_id"),
        }
    }
}

/// Literal compared against a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Bool(bool),
    Text(String),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Text(s) => write!(f, "'{}'", s),
        }
    }
}

/// Boolean predicate over execution records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpression {
    /// Field has no value
    NotSet(FilterField),
    /// Field equals the literal
    Equals(FilterField, FilterValue),
    And(Vec<FilterExpression>),
    Or(Vec<FilterExpression>),
}

impl FilterExpression {
    /// Expression matching every record (the empty conjunction)
    pub fn all() -> Self {
        Self::And(Vec::new())
    }

    /// Conjunction with `other`
    pub fn and(self, other: FilterExpression) -> Self {
        match self {
            Self::And(mut terms) => {
                terms.push(other);
                Self::And(terms)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Disjunction with `other`
    pub fn or(self, other: FilterExpression) -> Self {
        match self {
            Self::Or(mut terms) => {
                terms.push(other);
                Self::Or(terms)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    /// Evaluate against a record
    pub fn matches(&self, record: &ExecutionRecord) -> bool {
        match self {
            Self::NotSet(field) => field.value_of(record).is_none(),
            Self::Equals(field, value) => field.value_of(record).as_ref() == Some(value),
            Self::And(terms) => terms.iter().all(|t| t.matches(record)),
            Self::Or(terms) => terms.iter().any(|t| t.matches(record)),
        }
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSet(field) => write!(f, "{} NOT SET", field),
            Self::Equals(field, value) => write!(f, "{} == {}", field, value),
            Self::And(terms) => write_joined(f, terms, "AND"),
            Self::Or(terms) => write_joined(f, terms, "OR"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, terms: &[FilterExpression], op: &str) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", op)?;
        }
        write!(f, "({})", term)?;
    }
    Ok(())
}

/// Filter keeping executions that are not superseded by a later attempt
pub fn latest_in_chain_filter() -> FilterExpression {
    FilterExpression::NotSet(FilterField::ResumeChainId).or(FilterExpression::Equals(
        FilterField::LatestInChain,
        FilterValue::Bool(true),
    ))
}

/// Maintains resume chains in an execution store
pub struct ResumeChainTracker {
    store: Arc<dyn ExecutionStore>,
}

impl ResumeChainTracker {
    pub fn new(store: Arc<dyn ExecutionStore>) -> Self {
        Self { store }
    }

    /// Mark `new` as the latest attempt of `previous`'s chain and return the
    /// chain id. Only the two records are changed.
    pub fn link(new: &mut ExecutionRecord, previous: &mut ExecutionRecord) -> ResumeResult<String> {
        if new.id == previous.id {
            return Err(ResumeError::SelfLink {
                execution_id: new.id.clone(),
            });
        }

        let chain_id = previous
            .resume_chain_id
            .clone()
            .unwrap_or_else(|| previous.id.clone());

        new.resume_chain_id = Some(chain_id.clone());
        new.latest_in_chain = true;
        previous.resume_chain_id = Some(chain_id.clone());
        previous.latest_in_chain = false;

        Ok(chain_id)
    }

    /// Link two attempts and persist both, the new attempt first
    pub async fn link_after_resume(
        &self,
        new: &mut ExecutionRecord,
        previous: &mut ExecutionRecord,
    ) -> ResumeResult<String> {
        let chain_id = Self::link(new, previous)?;

        self.store
            .update_chain_link(&new.id, &chain_id, new.latest_in_chain)
            .await?;
        self.store
            .update_chain_link(&previous.id, &chain_id, previous.latest_in_chain)
            .await?;

        info!(
            chain = %chain_id,
            new = %new.id,
            previous = %previous.id,
            "linked resumed execution"
        );

        Ok(chain_id)
    }

    /// Other attempts in the chain of `execution`, newest first
    pub async fn resume_history(
        &self,
        execution: &ExecutionRecord,
    ) -> ResumeResult<Vec<ExecutionRecord>> {
        let Some(chain_id) = &execution.resume_chain_id else {
            return Ok(Vec::new());
        };

        let mut members: Vec<_> = self
            .store
            .find_by_chain(chain_id)
            .await?
            .into_iter()
            .filter(|r| r.id != execution.id)
            .collect();
        sort_newest_first(&mut members);

        Ok(members)
    }

    /// Stored executions matching `filter`, newest first
    pub async fn list_executions(
        &self,
        filter: &FilterExpression,
    ) -> ResumeResult<Vec<ExecutionRecord>> {
        let mut records: Vec<_> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        sort_newest_first(&mut records);

        Ok(records)
    }
}

fn sort_newest_first(records: &mut [ExecutionRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}
