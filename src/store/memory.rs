// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! In-memory execution store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{apply_chain_link, ExecutionStore};
use crate::errors::{ResumeError, ResumeResult};
use crate::execution::ExecutionRecord;

/// Execution store backed by a map
#[derive(Debug, Default)]
pub struct MemoryExecutionStore {
    records: RwLock<HashMap<String, ExecutionRecord>>,
}

impl MemoryExecutionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `records`
    pub fn with_records(records: impl IntoIterator<Item = ExecutionRecord>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().map(|r| (r.id.clone(), r)).collect()),
        }
    }
}

#[async_trait]
impl ExecutionStore for MemoryExecutionStore {
    async fn get(&self, id: &str) -> ResumeResult<Option<ExecutionRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn save(&self, execution: &ExecutionRecord) -> ResumeResult<()> {
        self.records
            .write()
            .await
            .insert(execution.id.clone(), execution.clone());
        Ok(())
    }

    async fn update_chain_link(&self, id: &str, chain_id: &str, latest: bool) -> ResumeResult<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| ResumeError::ExecutionNotFound { id: id.to_string() })?;
        apply_chain_link(record, chain_id, latest);
        Ok(())
    }

    async fn list(&self) -> ResumeResult<Vec<ExecutionRecord>> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}
