// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Pipeline definitions and types
//!
//! This module defines the static side of resume planning: pipeline
//! definitions, stage groups, stage elements and their resume variants.

mod definition;
mod validation;

pub use definition::*;
pub use validation::{PipelineValidator, ValidationResult};
