// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stage-resume contributors

//! Timestamp formatting

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Age of an epoch-millisecond timestamp relative to `now`, e.g. `3h ago`
pub fn format_age_at(created_at_ms: u64, now: SystemTime) -> String {
    let created = UNIX_EPOCH + Duration::from_millis(created_at_ms);
    match now.duration_since(created) {
        Ok(age) => format!("{} ago", format_duration(age)),
        Err(_) => "in the future".into(),
    }
}

/// Age of an epoch-millisecond timestamp
pub fn format_age(created_at_ms: u64) -> String {
    format_age_at(created_at_ms, SystemTime::now())
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86400)
    }
}
