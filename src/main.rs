// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! stage-resume - Checkpoint/resume planning for multi-stage pipelines

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stage_resume::cli::plan::ResumePoint;
use stage_resume::cli::{self, Cli, Commands, Context};
use stage_resume::utils::should_use_colors;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stage_resume=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if !should_use_colors() {
        colored::control::set_override(false);
    }

    let args = Cli::parse();

    // Change to specified directory if provided
    if let Some(ref dir) = args.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    let ctx = Context::load(args.config.as_deref(), args.verbose)?;

    match args.command {
        Commands::Check { execution, history } => cli::check::run(execution, history, &ctx).await,
        Commands::Candidates {
            pipeline,
            execution,
            format,
        } => cli::candidates::run(pipeline, execution, format, &ctx).await,
        Commands::Plan {
            pipeline,
            states,
            execution,
            index,
            from_stage,
            output,
        } => {
            let point = match (index, from_stage) {
                (Some(index), _) => ResumePoint::Index(index),
                (None, Some(name)) => ResumePoint::Stage(name),
                (None, None) => return Err(miette::miette!("Pass --index or --from-stage")),
            };
            cli::plan::run(pipeline, states, execution, point, output, &ctx).await
        }
        Commands::Link {
            new_id,
            previous_id,
        } => cli::link::run(new_id, previous_id, &ctx).await,
        Commands::History { execution_id } => cli::history::run(execution_id, &ctx).await,
        Commands::List { all, pipeline } => cli::list::run(all, pipeline, &ctx).await,
        Commands::Import { executions } => cli::import::run(executions, &ctx).await,
        Commands::Validate { pipeline } => cli::validate::run(pipeline, &ctx).await,
    }
}
