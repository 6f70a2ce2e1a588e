//! Timestamps and policy validity windows
//!
//! Policy bounds and request times share one wire format, `yyyy-MM-dd HH:mm`
//! (zero-padded, 24-hour clock). Anything else is rejected with
//! [`PolicyError::MalformedTimestamp`] instead of being treated as a miss.

use crate::error::{PolicyError, Result, TimestampField};
use chrono::{Datelike, NaiveDateTime};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// chrono format string for the wire format
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Exact layout of the wire format
///
/// chrono alone accepts unpadded fields ("2024-1-1 9:00") and signed or
/// longer years, so the layout is checked before parsing.
const LAYOUT_PATTERN: &str = r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}$";

fn layout() -> &'static Regex {
    static LAYOUT: OnceLock<Regex> = OnceLock::new();
    LAYOUT.get_or_init(|| Regex::new(LAYOUT_PATTERN).expect("timestamp layout regex is valid"))
}

/// A minute-precision point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Parse a timestamp in `yyyy-MM-dd HH:mm` format
    ///
    /// # Errors
    ///
    /// Returns `MalformedTimestamp` tagged with `field` if the layout is wrong
    /// or the value is not a real calendar date/time.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbac::{Timestamp, TimestampField};
    ///
    /// let ts = Timestamp::parse("2024-01-01 10:00", TimestampField::CurrentTime).unwrap();
    /// assert_eq!(ts.to_string(), "2024-01-01 10:00");
    ///
    /// assert!(Timestamp::parse("2024-1-1 10:00", TimestampField::CurrentTime).is_err());
    /// assert!(Timestamp::parse("2024-02-30 10:00", TimestampField::CurrentTime).is_err());
    /// ```
    pub fn parse(value: &str, field: TimestampField) -> Result<Self> {
        let malformed = || PolicyError::MalformedTimestamp {
            field,
            value: value.to_string(),
        };

        if !layout().is_match(value) {
            return Err(malformed());
        }

        // Year 0000 has no year-of-era; the first valid year is 0001
        match NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT) {
            Ok(parsed) if parsed.year() >= 1 => Ok(Timestamp(parsed)),
            _ => Err(malformed()),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

/// Check whether `current` lies strictly inside the optional window
///
/// Both present bounds are parsed before either is compared, so a malformed
/// bound is reported even when the other bound already excludes `current`.
pub fn in_window(from_time: Option<&str>, to_time: Option<&str>, current: Timestamp) -> Result<bool> {
    let from = from_time
        .map(|value| Timestamp::parse(value, TimestampField::FromTime))
        .transpose()?;
    let to = to_time
        .map(|value| Timestamp::parse(value, TimestampField::ToTime))
        .transpose()?;

    if let Some(from) = from {
        if current <= from {
            return Ok(false);
        }
    }

    if let Some(to) = to {
        if current >= to {
            return Ok(false);
        }
    }

    Ok(true)
}
