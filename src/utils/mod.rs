// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Utility modules
//!
//! Terminal output helpers for the stage-resume CLI.

pub mod colors;
pub mod time;

pub use colors::*;
pub use time::format_age;
