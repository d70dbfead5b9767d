//! Compact run-time formatting for status lines.

use std::time::Duration;

/// Format `duration` as `"250ms"`, `"1.50s"` or `"2m 05s"`.
pub fn format_duration(duration: Duration) -> String {
    format_millis(i64::try_from(duration.as_millis()).unwrap_or(i64::MAX))
}

/// Like [`format_duration`], for a signed millisecond count such as a
/// `chrono::Duration`. Negative values (clock skew) count as zero.
pub fn format_millis(millis: i64) -> String {
    let millis = millis.max(0);
    match millis {
        0..=999 => format!("{millis}ms"),
        1_000..=59_999 => format!("{:.2}s", millis as f64 / 1000.0),
        _ => format!("{}m {:02}s", millis / 60_000, (millis % 60_000) / 1000),
    }
}

#[cfg(test)]
#[path = "elapsed.test.rs"]
mod tests;
