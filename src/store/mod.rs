// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Execution record storage
//!
//! The chain tracker persists resume linkage through this trait. Every write
//! touches a single record, so implementations need no transactions.

mod filesystem;
mod memory;

pub use filesystem::{FilesystemExecutionStore, DEFAULT_STORE_DIR};
pub use memory::MemoryExecutionStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{ResumeError, ResumeResult};
use crate::execution::ExecutionRecord;

/// Trait for execution record stores
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    /// Get an execution record by id
    async fn get(&self, id: &str) -> ResumeResult<Option<ExecutionRecord>>;

    /// Insert or replace an execution record
    async fn save(&self, execution: &ExecutionRecord) -> ResumeResult<()>;

    /// Set the chain fields of one stored record
    async fn update_chain_link(&self, id: &str, chain_id: &str, latest: bool) -> ResumeResult<()>;

    /// Every stored execution record, in no particular order
    async fn list(&self) -> ResumeResult<Vec<ExecutionRecord>>;

    /// Members of a resume chain, in no particular order
    async fn find_by_chain(&self, chain_id: &str) -> ResumeResult<Vec<ExecutionRecord>> {
        let records = self.list().await?;
        Ok(records
            .into_iter()
            .filter(|r| r.resume_chain_id.as_deref() == Some(chain_id))
            .collect())
    }

    /// Get an execution record, or `ExecutionNotFound`
    async fn require(&self, id: &str) -> ResumeResult<ExecutionRecord> {
        self.get(id)
            .await?
            .ok_or_else(|| ResumeError::ExecutionNotFound { id: id.to_string() })
    }

    /// Store statistics
    async fn stats(&self) -> ResumeResult<StoreStats> {
        let records = self.list().await?;
        Ok(StoreStats::from_records(&records))
    }
}

/// Store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of stored executions
    pub executions: usize,
    /// Number of distinct resume chains
    pub chains: usize,
    /// Executions superseded by a later attempt
    pub superseded: usize,
}

impl StoreStats {
    fn from_records(records: &[ExecutionRecord]) -> Self {
        let mut chains: Vec<&str> = records
            .iter()
            .filter_map(|r| r.resume_chain_id.as_deref())
            .collect();
        chains.sort_unstable();
        chains.dedup();

        Self {
            executions: records.len(),
            chains: chains.len(),
            superseded: records
                .iter()
                .filter(|r| r.in_chain() && !r.latest_in_chain)
                .count(),
        }
    }
}

/// Apply chain fields to a record in place
pub(crate) fn apply_chain_link(record: &mut ExecutionRecord, chain_id: &str, latest: bool) {
    record.resume_chain_id = Some(chain_id.to_string());
    record.latest_in_chain = latest;
}
