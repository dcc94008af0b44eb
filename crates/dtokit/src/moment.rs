//! Date/time values for the `date`, `datetime` and `timestamp` casts.
//!
//! [`Moment`] is a thin wrapper over a UTC [`NaiveDateTime`]. It offers the four
//! operations the cast engine relies on:
//!
//! - construct from a string ([`Moment::parse`], [`Moment::parse_with_format`])
//! - construct from a unix timestamp ([`Moment::from_timestamp`])
//! - format to a string ([`Moment::format`])
//! - convert back to a unix timestamp ([`Moment::timestamp`])
//!
//! ## Accepted Input
//!
//! | Input | Example | Result |
//! |-------|---------|--------|
//! | Integer literal | `"-14173440"` | Seconds since the epoch |
//! | Plain date | `"1969-07-20"` | Start of that day |
//! | Instance format | depends on configuration | Parsed with the given pattern |
//! | Date and time | `"1969-07-20 22:56:00"`, `"1969-07-20T22:56:00"` | As written |
//! | RFC 3339 | `"1969-07-20T22:56:00+02:00"` | Converted to UTC |
//!
//! Patterns use chrono's strftime syntax.

use std::fmt::{self, Write};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{DtoError, Result};

/// `YYYY-MM-DD`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// `YYYY-MM-DD HH:MM:SS`, the default serialization format.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const FALLBACK_FORMATS: &[&str] = &[
    DATE_TIME_FORMAT,
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A point in time, interpreted as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Moment(NaiveDateTime);

impl Moment {
    /// Build a moment from seconds since the unix epoch.
    pub fn from_timestamp(secs: i64) -> Result<Self> {
        DateTime::from_timestamp(secs, 0)
            .map(|dt| Self(dt.naive_utc()))
            .ok_or_else(|| invalid(secs.to_string(), "timestamp out of range"))
    }

    /// Parse a date/time string using the default date-time pattern.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with_format(text, DATE_TIME_FORMAT)
    }

    /// Parse a date/time string, trying `format` before the built-in patterns.
    pub fn parse_with_format(text: &str, format: &str) -> Result<Self> {
        let trimmed = text.trim();

        if is_integer_literal(trimmed) {
            let secs = trimmed
                .parse::<i64>()
                .map_err(|e| invalid(trimmed, e.to_string()))?;
            return Self::from_timestamp(secs);
        }

        if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(Self)
                .ok_or_else(|| invalid(trimmed, "no start of day"));
        }

        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(Self(dt));
        }

        // date-only patterns carry no time fields for NaiveDateTime
        if let Some(dt) = NaiveDate::parse_from_str(trimmed, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            return Ok(Self(dt));
        }

        for pattern in FALLBACK_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, pattern) {
                return Ok(Self(dt));
            }
        }

        DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| Self(dt.naive_utc()))
            .map_err(|_| invalid(trimmed, "unrecognized date/time"))
    }

    /// Render with a strftime pattern.
    ///
    /// Fails with [`DtoError::InvalidDateFormat`] when the pattern contains
    /// specifiers chrono cannot render.
    pub fn format(&self, pattern: &str) -> Result<String> {
        let mut out = String::new();
        write!(out, "{}", self.0.format(pattern))
            .map_err(|_| DtoError::InvalidDateFormat(pattern.to_string()))?;
        Ok(out)
    }

    /// Seconds since the unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.0.and_utc().timestamp()
    }

    pub fn to_date_string(&self) -> String {
        self.0.format(DATE_FORMAT).to_string()
    }

    pub fn to_date_time_string(&self) -> String {
        self.0.format(DATE_TIME_FORMAT).to_string()
    }
}

fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn invalid(value: impl Into<String>, reason: impl Into<String>) -> DtoError {
    DtoError::InvalidDate {
        value: value.into(),
        reason: reason.into(),
    }
}

impl FromStr for Moment {
    type Err = DtoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<NaiveDateTime> for Moment {
    fn from(dt: NaiveDateTime) -> Self {
        Self(dt)
    }
}

impl From<DateTime<Utc>> for Moment {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt.naive_utc())
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_TIME_FORMAT))
    }
}
