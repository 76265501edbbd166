//! Date helpers. The system of record speaks `YYYY-MM-DD`; people read `5 Jan 2025`.

use crate::error::Res;
use anyhow::Context;
use chrono::{DateTime, Datelike, Local, NaiveDate};

/// Short month names as written in Indonesian.
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

const ISO_DATE: &str = "%Y-%m-%d";

/// Today's date in the local time zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses a `YYYY-MM-DD` string.
pub fn parse_iso_date(s: &str) -> Res<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), ISO_DATE)
        .with_context(|| format!("'{s}' is not a date in the form YYYY-MM-DD"))
}

/// Formats a date the way it is shown in lists, e.g. `5 Jan 2025`.
pub fn format_date(date: NaiveDate) -> String {
    // month0 is always 0..=11
    let month = MONTHS[date.month0() as usize];
    format!("{} {} {}", date.day(), month, date.year())
}

/// Formats whatever the system of record sent as a date.
///
/// - empty -> `-`
/// - `YYYY-MM-DD` -> `5 Jan 2025`
/// - an RFC 3339 timestamp -> its local calendar date, formatted as above
/// - anything else is returned unchanged
pub fn format_tanggal(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return "-".to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, ISO_DATE) {
        return format_date(date);
    }
    match DateTime::parse_from_rfc3339(trimmed) {
        Ok(ts) => format_date(ts.with_timezone(&Local).date_naive()),
        Err(_) => s.to_string(),
    }
}
