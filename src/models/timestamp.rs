use chrono::{DateTime, Local, NaiveDateTime, Timelike};

const FORMAT_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";
const FORMAT_MICROS: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Current local wall-clock time, truncated to microseconds.
///
/// Truncation keeps in-memory values equal to what survives a write/read cycle.
pub fn now() -> NaiveDateTime {
    truncate_to_micros(Local::now().naive_local())
}

fn truncate_to_micros(value: NaiveDateTime) -> NaiveDateTime {
    value
        .with_nanosecond(value.nanosecond() / 1_000 * 1_000)
        .unwrap_or(value)
}

/// Render as ISO-8601 without offset. The fraction is omitted when it is zero.
pub fn format_timestamp(value: &NaiveDateTime) -> String {
    if value.nanosecond() % 1_000_000_000 / 1_000 == 0 {
        value.format(FORMAT_SECONDS).to_string()
    } else {
        value.format(FORMAT_MICROS).to_string()
    }
}

/// Parse an ISO-8601 date-time.
///
/// Accepts `T` or a space as separator, an optional fraction, and RFC 3339
/// strings with an offset (the offset is dropped, keeping the local reading).
/// Digits past the microsecond are discarded, matching [`format_timestamp`].
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let parsed = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_local())
        });
    parsed.map(truncate_to_micros)
}
