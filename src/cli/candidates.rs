// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Candidates command - list resume points of an execution

use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use super::{reject, Context, OutputFormat};
use crate::execution::ExecutionRecord;
use crate::pipeline::PipelineDefinition;
use crate::resume::list_resume_candidates;
use crate::utils::print_header;

/// Run the candidates command
pub async fn run(
    pipeline_path: PathBuf,
    execution_path: PathBuf,
    format: OutputFormat,
    ctx: &Context,
) -> Result<()> {
    let pipeline = PipelineDefinition::from_file(&pipeline_path)?;
    let execution = ExecutionRecord::from_file(&execution_path)?;

    let candidates = list_resume_candidates(&pipeline, &execution).map_err(reject)?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&candidates).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            print_header(&format!("Resume points for {}", execution.display_name()));

            if candidates.is_empty() {
                println!("{}", "  No stage was attempted.".dimmed());
                return Ok(());
            }

            for candidate in &candidates {
                println!(
                    "  {:>3}  {}  {}",
                    candidate.parallel_index.to_string().cyan(),
                    candidate.name.bold(),
                    candidate.element_names.join(", ").dimmed()
                );
            }

            if ctx.verbose {
                println!();
                println!(
                    "{}",
                    format!(
                        "  {} of {} stage groups attempted",
                        candidates.len(),
                        pipeline.stage_groups.len()
                    )
                    .dimmed()
                );
            }
        }
    }

    Ok(())
}
