//! Display helpers shared by the tables and the stored duration column.

use crate::libs::duration::ClockTime;
use chrono::Duration;

/// Formats a duration as zero-padded `HH:MM`. Negative durations show as `00:00`.
///
/// ```rust
/// use nounou::libs::formatter::format_duration;
/// use chrono::Duration;
///
/// assert_eq!(format_duration(&Duration::minutes(90)), "01:30");
/// assert_eq!(format_duration(&Duration::zero()), "00:00");
/// assert_eq!(format_duration(&Duration::hours(-1)), "00:00");
/// ```
pub fn format_duration(duration: &Duration) -> String {
    let hours = duration.num_hours();
    let mins = duration.num_minutes() % 60;

    format!("{:02}:{:02}", hours.max(0), mins.max(0))
}

/// Time cell for tables; a missing time renders as `-`.
pub fn format_clock(time: Option<&ClockTime>) -> String {
    time.map(ToString::to_string).unwrap_or_else(|| "-".to_string())
}

/// Optional text cell; missing or blank renders as `-`.
pub fn format_optional(text: Option<&str>) -> String {
    match text.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => "-".to_string(),
    }
}
