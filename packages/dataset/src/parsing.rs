//! Cell-level parsing for the incident CSV.
//!
//! Nothing in here fails: values that cannot be understood come back as
//! `None` and the loader decides what that means for the row.

use chrono::{NaiveDate, NaiveDateTime};

/// Timestamp layouts tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M:%S %p",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts, interpreted as midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parses an incident timestamp. Returns `None` for anything that matches
/// none of the known layouts.
#[must_use]
pub fn parse_incident_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parses a victim age. Negative, non-numeric and non-finite values yield
/// `None`; fractional ages are truncated and ages beyond `u32::MAX`
/// saturate.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_victim_age(s: &str) -> Option<u32> {
    let s = s.trim();
    if let Ok(age) = s.parse::<i64>() {
        return (age >= 0).then(|| u32::try_from(age).unwrap_or(u32::MAX));
    }

    let age = s.parse::<f64>().ok()?;
    if !age.is_finite() || age < 0.0 {
        return None;
    }
    Some(age.trunc().min(f64::from(u32::MAX)) as u32)
}

/// Returns the trimmed cell, or `None` when it is blank.
#[must_use]
pub fn non_blank(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}
