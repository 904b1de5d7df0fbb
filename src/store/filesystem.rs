// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Filesystem-based execution store
//!
//! Stores each execution record as `<id>.json` in a store directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{apply_chain_link, ExecutionStore};
use crate::errors::{ResumeError, ResumeResult};
use crate::execution::ExecutionRecord;

/// Default store directory, relative to the working directory
pub const DEFAULT_STORE_DIR: &str = ".stage-resume/executions";

/// Filesystem-based execution store
#[derive(Debug, Clone)]
pub struct FilesystemExecutionStore {
    store_dir: PathBuf,
}

impl FilesystemExecutionStore {
    /// Open a store rooted at `store_dir`, creating the directory if needed
    pub fn new(store_dir: PathBuf) -> ResumeResult<Self> {
        if !store_dir.exists() {
            std::fs::create_dir_all(&store_dir).map_err(|e| {
                ResumeError::store(format!(
                    "Failed to create store directory '{}': {}",
                    store_dir.display(),
                    e
                ))
            })?;
        }

        Ok(Self { store_dir })
    }

    /// Path of the file holding record `id`
    fn record_path(&self, id: &str) -> ResumeResult<PathBuf> {
        if id.is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
            return Err(ResumeError::store(format!(
                "Execution id '{}' cannot be used as a file name",
                id
            )));
        }
        Ok(self.store_dir.join(format!("{}.json", id)))
    }

    async fn read_record(path: &Path) -> ResumeResult<ExecutionRecord> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ResumeError::FileRead {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;
        ExecutionRecord::from_json(&content)
    }

    async fn write_record(&self, execution: &ExecutionRecord) -> ResumeResult<()> {
        let path = self.record_path(&execution.id)?;
        let json = execution.to_json()?;

        tokio::fs::write(&path, json)
            .await
            .map_err(|e| ResumeError::FileWrite {
                path: path.clone(),
                error: e.to_string(),
            })?;

        debug!(execution = %execution.id, path = %path.display(), "wrote execution record");
        Ok(())
    }
}

#[async_trait]
impl ExecutionStore for FilesystemExecutionStore {
    async fn get(&self, id: &str) -> ResumeResult<Option<ExecutionRecord>> {
        let path = self.record_path(id)?;
        if !path.exists() {
            return Ok(None);
        }

        Self::read_record(&path).await.map(Some)
    }

    async fn save(&self, execution: &ExecutionRecord) -> ResumeResult<()> {
        self.write_record(execution).await
    }

    async fn update_chain_link(&self, id: &str, chain_id: &str, latest: bool) -> ResumeResult<()> {
        let mut record = self.require(id).await?;
        apply_chain_link(&mut record, chain_id, latest);
        self.write_record(&record).await
    }

    async fn list(&self) -> ResumeResult<Vec<ExecutionRecord>> {
        let mut records = Vec::new();

        if !self.store_dir.exists() {
            return Ok(records);
        }

        let mut entries = tokio::fs::read_dir(&self.store_dir)
            .await
            .map_err(|e| ResumeError::store(format!("Failed to read store directory: {}", e)))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ResumeError::store(format!("Failed to read store entry: {}", e)))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match Self::read_record(&path).await {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable execution record"),
            }
        }

        Ok(records)
    }
}
