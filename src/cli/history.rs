// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! History command - attempts sharing a resume chain

use colored::Colorize;
use miette::Result;

use super::{reject, Context};
use crate::resume::{check_resume_history_visible, ResumeChainTracker};
use crate::utils::{format_age, print_header, status};

/// Run the history command
pub async fn run(execution_id: String, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let execution = store.require(&execution_id).await.map_err(reject)?;
    check_resume_history_visible(&execution).map_err(reject)?;

    let tracker = ResumeChainTracker::new(store);
    let history = tracker.resume_history(&execution).await?;

    print_header(&format!("Resume history of {}", execution.display_name()));

    if history.is_empty() {
        println!("{}", "  No other attempts.".dimmed());
        return Ok(());
    }

    for attempt in &history {
        let marker = if attempt.latest_in_chain { "*" } else { " " };
        println!(
            "  {} {}  {}  {}",
            marker.green(),
            attempt.id.bold(),
            status(attempt.status),
            format_age(attempt.created_at).dimmed()
        );
    }

    if ctx.verbose {
        if let Some(chain_id) = &execution.resume_chain_id {
            println!();
            println!("{}", format!("  Chain: {}", chain_id).dimmed());
        }
    }

    Ok(())
}
