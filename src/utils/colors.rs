// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Terminal color utilities

use colored::{ColoredString, Colorize};

use crate::errors::RecoverySuggestion;
use crate::execution::ExecutionStatus;

/// Execution status colored by outcome
pub fn status(status: ExecutionStatus) -> ColoredString {
    let label = status.to_string();
    match status {
        ExecutionStatus::Success => label.green(),
        ExecutionStatus::Skipped | ExecutionStatus::Queued => label.dimmed(),
        ExecutionStatus::Running | ExecutionStatus::Waiting => label.blue(),
        ExecutionStatus::Aborted
        | ExecutionStatus::Failed
        | ExecutionStatus::Rejected
        | ExecutionStatus::Expired
        | ExecutionStatus::Error => label.red(),
    }
}

/// Whether colored output should be produced
pub fn should_use_colors() -> bool {
    // https://no-color.org
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    std::env::var("TERM").is_ok_and(|term| term != "dumb")
}

/// Print a styled header
pub fn print_header(title: &str) {
    println!("{}", title.bold());
    println!("{}", "═".repeat(title.len().max(40)));
}

/// Print a success check
pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print an error cross to stderr
pub fn print_error(msg: &str) {
    eprintln!("  {} {}", "✗".red(), msg);
}

/// Print a warning
pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

/// Print a recovery suggestion to stderr
pub fn print_suggestion(suggestion: &RecoverySuggestion) {
    eprintln!();
    eprint!("{}", suggestion.to_string().cyan());
}
