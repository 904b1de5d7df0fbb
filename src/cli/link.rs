// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Link command - record that one execution resumed another

use colored::Colorize;
use miette::Result;

use super::{reject, Context};
use crate::resume::ResumeChainTracker;
use crate::utils::print_success;

/// Run the link command
pub async fn run(new_id: String, previous_id: String, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;

    let mut new = store.require(&new_id).await.map_err(reject)?;
    let mut previous = store.require(&previous_id).await.map_err(reject)?;

    let tracker = ResumeChainTracker::new(store);
    let chain_id = tracker
        .link_after_resume(&mut new, &mut previous)
        .await
        .map_err(reject)?;

    print_success(&format!(
        "'{}' is now the latest attempt of chain {}",
        new.id,
        chain_id.cyan()
    ));

    Ok(())
}
