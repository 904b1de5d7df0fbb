// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Execution history and runtime state
//!
//! The dynamic side of resume planning: what actually ran during an attempt,
//! and the state instances that attempt created.

mod record;
mod state;

pub use record::*;
pub use state::{RuntimeStateInstance, StateData, StateInstanceMap};
