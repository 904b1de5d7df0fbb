// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Plan command - build the definition for a resumed attempt

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::{reject, Context};
use crate::errors::ResumeError;
use crate::execution::{ExecutionRecord, StateInstanceMap};
use crate::pipeline::PipelineDefinition;
use crate::resume::{build_resume_plan, check_resumable, resolve_resume_point};
use crate::utils::print_success;

/// Where the resumed attempt starts
#[derive(Debug, Clone)]
pub enum ResumePoint {
    Index(u32),
    Stage(String),
}

/// Run the plan command
pub async fn run(
    pipeline_path: PathBuf,
    states_path: PathBuf,
    execution_path: PathBuf,
    point: ResumePoint,
    output: Option<PathBuf>,
    ctx: &Context,
) -> Result<()> {
    let pipeline = PipelineDefinition::from_file(&pipeline_path)?;
    let execution = ExecutionRecord::from_file(&execution_path)?;
    let states = StateInstanceMap::from_file(&states_path)?;

    check_resumable(&execution).map_err(reject)?;

    let resume_index = match point {
        ResumePoint::Index(index) => index,
        ResumePoint::Stage(name) => {
            resolve_resume_point(&pipeline, &execution, &name).map_err(reject)?
        }
    };

    let plan = build_resume_plan(&pipeline, resume_index, &execution, &states).map_err(reject)?;

    match output {
        Some(path) => {
            let (resumed, fresh) = (plan.resumed_group_count(), plan.fresh_group_count());
            let yaml = plan.into_pipeline().to_yaml()?;
            std::fs::write(&path, yaml).map_err(|e| ResumeError::FileWrite {
                path: path.clone(),
                error: e.to_string(),
            })?;

            print_success(&format!(
                "Resume plan for '{}' written to {}",
                execution.id,
                path.display()
            ));
            println!(
                "    {} stage group(s) reuse prior results, {} run fresh",
                resumed.to_string().cyan(),
                fresh.to_string().cyan()
            );
        }
        None => {
            if ctx.verbose {
                eprintln!(
                    "{}",
                    format!(
                        "# resuming '{}' at parallel index {}",
                        plan.source_execution_id, plan.resume_parallel_index
                    )
                    .dimmed()
                );
            }
            print!("{}", plan.into_pipeline().to_yaml()?);
        }
    }

    Ok(())
}
