//! Human-readable duration strings.
//!
//! Two policies live here side by side: the compact tracker label
//! (`"3h 25m"`) and the verbose phrase used for time tracked today
//! (`"2 hours"`). Both are pure functions of the second count.

const MINUTE: u64 = 60;
const HOUR: u64 = MINUTE * 60;
const DAY: u64 = HOUR * 24;
const WEEK: u64 = DAY * 7;
// Fixed 30-day months and 360-day years keep output stable.
const MONTH: u64 = DAY * 30;
const YEAR: u64 = MONTH * 12;

/// Compact tracker label: `"{h}h {m}m"`, or `"{m}m"` below one hour.
pub fn format_compact(secs: u64) -> String {
    compact_parts(secs / HOUR, (secs % HOUR) / MINUTE)
}

/// Render an already split hour/minute pair the same way as [`format_compact`].
pub fn compact_parts(hours: u64, minutes: u64) -> String {
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Verbose phrase for an elapsed duration.
///
/// | range                | output                     |
/// |----------------------|----------------------------|
/// | < 30s                | `just now`                 |
/// | < 1 minute           | `{n} seconds`              |
/// | < 2 minutes          | `a minute`                 |
/// | < 1 hour             | `{n} minutes`              |
/// | exactly 1 whole hour | `an hour`                  |
/// | < 1 day              | `{n} hours`                |
/// | < 2 days             | `yesterday`                |
/// | < 1 week             | `{n} days`                 |
/// | < 30 days            | `a week` / `{n} weeks`     |
/// | < 360 days           | `a month` / `{n} months`   |
/// | otherwise            | `a year` / `{n} years`     |
pub fn format_relative(secs: u64) -> String {
    if secs < 30 {
        return "just now".to_string();
    }
    if secs < MINUTE {
        return format!("{} seconds", secs);
    }
    if secs < 2 * MINUTE {
        return "a minute".to_string();
    }
    if secs < HOUR {
        return format!("{} minutes", secs / MINUTE);
    }
    if secs / HOUR == 1 {
        return "an hour".to_string();
    }
    if secs < DAY {
        return format!("{} hours", secs / HOUR);
    }
    if secs < 2 * DAY {
        return "yesterday".to_string();
    }
    if secs < WEEK {
        return counted(secs / DAY, "day", "a");
    }
    if secs < MONTH {
        return counted(secs / WEEK, "week", "a");
    }
    if secs < YEAR {
        return counted(secs / MONTH, "month", "a");
    }
    counted(secs / YEAR, "year", "a")
}

fn counted(count: u64, unit: &str, article: &str) -> String {
    if count == 1 {
        format!("{} {}", article, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}
