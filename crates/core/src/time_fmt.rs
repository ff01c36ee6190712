// SPDX-License-Identifier: MIT

//! Human-readable duration formatting for log lines and CLI output.

use std::time::Duration;

/// Format a duration the way service-start/stop log lines render it:
/// sub-second durations as milliseconds, otherwise seconds with one
/// decimal place.
pub fn format_elapsed(d: Duration) -> String {
    if d < Duration::from_secs(1) {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}

/// Format a duration in milliseconds only, for structured fields.
pub fn format_elapsed_ms(d: Duration) -> u64 {
    d.as_millis() as u64
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
