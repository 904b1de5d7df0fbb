// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Tool configuration
//!
//! Read from `.stage-resume.yaml` in the working directory. Every field has
//! a default, so a missing file is the same as an empty one.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{ResumeError, ResumeResult};
use crate::store::DEFAULT_STORE_DIR;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = ".stage-resume.yaml";

/// stage-resume configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeConfig {
    /// Configuration format version
    #[serde(default = "default_version")]
    pub version: String,

    /// Execution store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Execution listing settings
    #[serde(default)]
    pub listing: ListingConfig,
}

fn default_version() -> String {
    "1".into()
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            store: StoreConfig::default(),
            listing: ListingConfig::default(),
        }
    }
}

/// Execution store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding execution records, relative to the working directory
    #[serde(default = "default_store_directory")]
    pub directory: PathBuf,
}

fn default_store_directory() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_DIR)
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            directory: default_store_directory(),
        }
    }
}

/// Execution listing settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Hide attempts superseded by a later resume
    #[serde(default = "default_true")]
    pub latest_only: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { latest_only: true }
    }
}

impl ResumeConfig {
    /// Load from file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> ResumeResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ResumeError::FileRead {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_yaml(&content)
    }

    /// Load from a working directory (looks for `.stage-resume.yaml`)
    pub fn load_from_dir(dir: &Path) -> ResumeResult<Self> {
        Self::load(&dir.join(CONFIG_FILE_NAME))
    }

    /// Parse configuration YAML; an empty document yields the defaults
    pub fn from_yaml(yaml: &str) -> ResumeResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// Store directory resolved against `base_dir`
    pub fn store_dir(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.store.directory)
    }
}
