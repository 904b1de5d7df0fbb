// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Import command - save execution records into the store

use miette::Result;
use std::path::PathBuf;

use super::Context;
use crate::execution::ExecutionRecord;
use crate::utils::print_success;

/// Run the import command
pub async fn run(paths: Vec<PathBuf>, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;

    for path in &paths {
        let execution = ExecutionRecord::from_file(path)?;
        store.save(&execution).await?;
        print_success(&format!("Imported '{}'", execution.id));
    }

    Ok(())
}
