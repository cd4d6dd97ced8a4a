// Due dates are unix milliseconds, rendered and parsed in UTC.

use time::macros::format_description;
use time::{Date, OffsetDateTime};

pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

fn to_datetime(ms: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000).ok()
}

/// Renders a due date as e.g. `07 Mar 2025`.
pub fn format_due_date(ms: i64) -> String {
    let format = format_description!("[day] [month repr:short] [year]");
    to_datetime(ms)
        .and_then(|dt| dt.format(format).ok())
        .unwrap_or_else(|| ms.to_string())
}

/// Renders a due date the way the creation form accepts it.
pub fn format_input_date(ms: i64) -> String {
    let format = format_description!("[year]-[month]-[day]");
    to_datetime(ms)
        .and_then(|dt| dt.format(format).ok())
        .unwrap_or_default()
}

/// Parses `YYYY-MM-DD`, keeping the time of day of `now_ms`.
pub fn parse_due_date(input: &str, now_ms: i64) -> Option<i64> {
    let format = format_description!("[year]-[month]-[day]");
    let date = Date::parse(input.trim(), format).ok()?;
    let time_of_day = to_datetime(now_ms)?.time();
    let due = date.with_time(time_of_day).assume_utc();
    Some((due.unix_timestamp_nanos() / 1_000_000) as i64)
}
