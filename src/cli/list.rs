// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! List command - stored executions

use colored::Colorize;
use miette::Result;

use super::Context;
use crate::resume::{
    latest_in_chain_filter, FilterExpression, FilterField, FilterValue, ResumeChainTracker,
};
use crate::utils::{format_age, print_header, status};

/// Run the list command
pub async fn run(all: bool, pipeline: Option<String>, ctx: &Context) -> Result<()> {
    let mut filter = if all || !ctx.config.listing.latest_only {
        FilterExpression::all()
    } else {
        latest_in_chain_filter()
    };
    if let Some(pipeline_id) = pipeline {
        filter = filter.and(FilterExpression::Equals(
            FilterField::PipelineId,
            FilterValue::Text(pipeline_id),
        ));
    }

    let store = ctx.open_store()?;
    let tracker = ResumeChainTracker::new(store.clone());
    let executions = tracker.list_executions(&filter).await?;

    print_header("Executions");

    if ctx.verbose {
        println!("{}", format!("  filter: {}", filter).dimmed());
    }

    if executions.is_empty() {
        println!("{}", "  No stored executions.".dimmed());
        return Ok(());
    }

    for execution in &executions {
        let chain = match &execution.resume_chain_id {
            Some(chain_id) => format!("chain {}", chain_id),
            None => String::new(),
        };
        println!(
            "  {}  {}  {}  {}",
            execution.id.bold(),
            status(execution.status),
            format_age(execution.created_at).dimmed(),
            chain.dimmed()
        );
    }

    let stats = store.stats().await?;
    println!();
    println!(
        "{}",
        format!(
            "  {} stored, {} chains, {} superseded",
            stats.executions, stats.chains, stats.superseded
        )
        .dimmed()
    );

    Ok(())
}
