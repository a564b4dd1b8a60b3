//! Presentation formatters for numbers, percentages and timestamps.
//!
//! Every function here is pure; the only ambient input is the viewer's time
//! zone, and each local-time helper has a `_in_tz` counterpart taking it
//! explicitly.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    COMPACT_DATE_PATTERN, EPOCH_DATE_PATTERN, FULL_DATE_PATTERN, METRIC_KILO_BASE,
    METRIC_KILO_THRESHOLD, METRIC_MEGA_BASE, METRIC_MEGA_THRESHOLD, NAIVE_TIMESTAMP_LAYOUTS,
    SCHEDULE_ID_PATTERN,
};
use crate::numbers::{trunc_f64_to_i32, u64_to_f64};

/// Errors raised while turning a timestamp into display text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unrecognized timestamp {0:?}")]
    UnparsableDate(String),
    #[error("timestamp {0} is outside the supported range")]
    OutOfRange(i64),
}

/// A date-like value as it arrives from the different pipeline stages.
///
/// `Local` values already carry the viewer's wall-clock time and are formatted
/// untouched. Every other variant is an instant in UTC and is converted into
/// the viewer's zone before formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    Local(NaiveDateTime),
    Utc(DateTime<Utc>),
    UnixMillis(i64),
    Text(String),
}

impl DateInput {
    /// Resolve a UTC-based input into an instant. `Local` inputs are read as
    /// UTC wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be parsed or the epoch value is out
    /// of range.
    pub fn to_utc(&self) -> Result<DateTime<Utc>, FormatError> {
        match self {
            Self::Local(naive) => Ok(naive.and_utc()),
            Self::Utc(instant) => Ok(*instant),
            Self::UnixMillis(millis) => {
                DateTime::from_timestamp_millis(*millis).ok_or(FormatError::OutOfRange(*millis))
            }
            Self::Text(text) => parse_utc_timestamp(text),
        }
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Utc(value)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(value: NaiveDateTime) -> Self {
        Self::Local(value)
    }
}

impl From<i64> for DateInput {
    fn from(value: i64) -> Self {
        Self::UnixMillis(value)
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Parse a zone-less or RFC 3339 timestamp, treating zone-less text as UTC.
///
/// # Errors
///
/// Returns [`FormatError::UnparsableDate`] when no accepted layout matches.
pub fn parse_utc_timestamp(text: &str) -> Result<DateTime<Utc>, FormatError> {
    let trimmed = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for layout in NAIVE_TIMESTAMP_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, layout) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| FormatError::UnparsableDate(text.to_string()))
}

/// Render a fraction in `[0, 1]` as a percent string.
///
/// Exactly 0 and 1 always render without decimals.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn percentage(fraction: f64, digits: usize) -> String {
    let digits = if fraction == 0.0 || fraction == 1.0 {
        0
    } else {
        digits
    };
    format!("{:.*}%", digits, fraction * 100.0)
}

#[must_use]
pub fn to_fixed(number: f64, digits: usize) -> String {
    format!("{number:.digits$}")
}

/// Format a date-like value in the given zone.
///
/// # Errors
///
/// Returns an error if a UTC-based input cannot be resolved to an instant.
pub fn format_date_in_tz<Tz>(
    input: &DateInput,
    pattern: &str,
    tz: &Tz,
) -> Result<String, FormatError>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match input {
        DateInput::Local(naive) => Ok(naive.format(pattern).to_string()),
        other => {
            let instant = other.to_utc()?;
            Ok(instant.with_timezone(tz).format(pattern).to_string())
        }
    }
}

/// Format a date-like value in the viewer's local zone.
///
/// # Errors
///
/// Returns an error if a UTC-based input cannot be resolved to an instant.
pub fn format_date_in_local_tz(input: &DateInput, pattern: &str) -> Result<String, FormatError> {
    format_date_in_tz(input, pattern, &Local)
}

/// `YYYY-MM-DD HH:mm` in the viewer's zone.
///
/// # Errors
///
/// Returns an error if a UTC-based input cannot be resolved to an instant.
pub fn format_date_to_ymdhm(input: &DateInput) -> Result<String, FormatError> {
    format_date_in_local_tz(input, FULL_DATE_PATTERN)
}

/// `MM-DD HH:mm` in the viewer's zone.
///
/// # Errors
///
/// Returns an error if a UTC-based input cannot be resolved to an instant.
pub fn format_date_to_mdhm(input: &DateInput) -> Result<String, FormatError> {
    format_date_in_local_tz(input, COMPACT_DATE_PATTERN)
}

/// Canonical `YYYYMMDDHH` rotation key of a UTC instant.
#[must_use]
pub fn format_schedule_id(start: &DateTime<Utc>) -> String {
    start.format(SCHEDULE_ID_PATTERN).to_string()
}

/// Epoch seconds as `YYYY-MM-DD HH:mm:ss` in the given zone.
///
/// # Errors
///
/// Returns [`FormatError::OutOfRange`] for timestamps chrono cannot represent.
pub fn convert_epoch_in_tz<Tz>(seconds: i64, tz: &Tz) -> Result<String, FormatError>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let instant = DateTime::from_timestamp(seconds, 0).ok_or(FormatError::OutOfRange(seconds))?;
    format_date_in_tz(&DateInput::Utc(instant), EPOCH_DATE_PATTERN, tz)
}

/// Epoch seconds as `YYYY-MM-DD HH:mm:ss` in the viewer's zone.
///
/// # Errors
///
/// Returns [`FormatError::OutOfRange`] for timestamps chrono cannot represent.
pub fn convert_epoch(seconds: i64) -> Result<String, FormatError> {
    convert_epoch_in_tz(seconds, &Local)
}

/// Absolute difference between two instants as `HH:MM:SS`.
#[must_use]
pub fn time_difference<A: TimeZone, B: TimeZone>(a: &DateTime<A>, b: &DateTime<B>) -> String {
    let diff = a.with_timezone(&Utc) - b.with_timezone(&Utc);
    format_hms(diff.num_seconds().unsigned_abs())
}

/// Whole seconds as zero-padded `HH:MM:SS`; hours grow past two digits.
#[must_use]
pub fn format_hms(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricPrefix {
    Kilo,
    Mega,
}

impl fmt::Display for MetricPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricPrefix::Kilo => write!(f, "K"),
            MetricPrefix::Mega => write!(f, "M"),
        }
    }
}

/// Result of [`use_metric_prefix`]: either a scaled, suffixed value or the
/// original count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricCount {
    Scaled { value: String, prefix: MetricPrefix },
    Plain(u64),
}

impl MetricCount {
    #[must_use]
    pub const fn is_scaled(&self) -> bool {
        matches!(self, Self::Scaled { .. })
    }
}

impl fmt::Display for MetricCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricCount::Scaled { value, prefix } => write!(f, "{value}{prefix}"),
            MetricCount::Plain(count) => write!(f, "{count}"),
        }
    }
}

/// Compact a large count with a `K`/`M` suffix.
///
/// Counts from 10,000,000 are scaled by powers of ten million and counts from
/// 100,000 by powers of ten thousand; smaller counts pass through unchanged.
#[must_use]
pub fn use_metric_prefix(count: u64, digits: usize) -> MetricCount {
    if count >= METRIC_MEGA_THRESHOLD {
        MetricCount::Scaled {
            value: scale_by_base(count, METRIC_MEGA_BASE, digits),
            prefix: MetricPrefix::Mega,
        }
    } else if count >= METRIC_KILO_THRESHOLD {
        MetricCount::Scaled {
            value: scale_by_base(count, METRIC_KILO_BASE, digits),
            prefix: MetricPrefix::Kilo,
        }
    } else {
        MetricCount::Plain(count)
    }
}

fn scale_by_base(count: u64, base: f64, digits: usize) -> String {
    let value = u64_to_f64(count);
    let exponent = trunc_f64_to_i32(value.ln() / base.ln());
    to_fixed(value / base.powi(exponent), digits)
}
