// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Check command - resume eligibility of an execution

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::{reject, Context};
use crate::execution::ExecutionRecord;
use crate::resume::{check_resumable, check_resume_history_visible};
use crate::utils::{print_success, status};

/// Run the check command
pub async fn run(execution_path: PathBuf, history: bool, ctx: &Context) -> Result<()> {
    let execution = ExecutionRecord::from_file(&execution_path)?;

    if ctx.verbose {
        println!(
            "{} {} ({}, {} stage executions)",
            "Execution".bold(),
            execution.display_name(),
            status(execution.status),
            execution.stage_executions.len()
        );
        if let Some(chain_id) = &execution.resume_chain_id {
            let position = if execution.latest_in_chain { "latest" } else { "superseded" };
            println!("  Resume chain: {} ({})", chain_id, position.dimmed());
        }
    }

    if history {
        check_resume_history_visible(&execution).map_err(reject)?;
        print_success(&format!(
            "Resume history of '{}' can be shown",
            execution.id
        ));
    } else {
        check_resumable(&execution).map_err(reject)?;
        print_success(&format!("Execution '{}' can be resumed", execution.id));
    }

    Ok(())
}
