//! Date helpers: canonical `yymmdd` normalization and offset-phrase
//! conversion.

use chrono::NaiveDate;
use tracing::warn;

/// Rewrite a slash-delimited date (assumed month/day/year, with a 2- or
/// 4-digit year) into the canonical fixed-width `yymmdd` form. Month and
/// day are zero-padded; a 4-digit year is truncated to its last two
/// digits. Input without slashes is assumed canonical already and passed
/// through unchanged.
///
/// This is a pure string transform with no calendar validation; use
/// [`parse_canonical`] to turn the result into an actual date.
pub fn normalize_date(raw: &str) -> String {
    if let Some((month, rest)) = raw.split_once('/') {
        if let Some((day, year)) = rest.split_once('/') {
            let year = year
                .get(year.len().saturating_sub(2)..)
                .unwrap_or(year);
            return format!("{year:0>2}{month:0>2}{day:0>2}");
        }
    }
    raw.to_string()
}

/// Parse a canonical `yymmdd` string into a date, widening the year with
/// a `20` prefix. Returns `None` when the string is not six digits or
/// does not name a real calendar date.
pub fn parse_canonical(canon: &str) -> Option<NaiveDate> {
    if canon.len() != 6 || !canon.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = canon[..2].parse().ok()?;
    let month: u32 = canon[2..4].parse().ok()?;
    let day: u32 = canon[4..6].parse().ok()?;
    NaiveDate::from_ymd_opt(2000 + year, month, day)
}

/// Convert a "<number> <unit>" offset to a day count. Units match by
/// case-insensitive substring: "day" counts as-is, "week" multiplies by
/// 7, "month" by 30 (a fixed approximation, not calendar-aware).
///
/// An unrecognized unit is not an error: it logs a warning and falls
/// back to 30 days, since callers have no failure channel here.
pub fn offset_to_days(amount: i64, unit: &str) -> i64 {
    let unit = unit.to_lowercase();
    if unit.contains("day") {
        amount
    } else if unit.contains("week") {
        amount * 7
    } else if unit.contains("month") {
        amount * 30
    } else {
        warn!("unrecognized offset unit '{unit}', defaulting to 30 days");
        30
    }
}
