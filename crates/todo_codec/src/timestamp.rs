//! Points in time with a fixed millisecond precision.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use std::fmt;

/// A UTC instant normalised to millisecond precision.
///
/// Normalising at construction means that a value written as fractional
/// seconds and read back compares equal to the original: float noise below
/// one millisecond is rounded away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current time, truncated to milliseconds.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now().trunc_subsecs(3))
    }

    /// Creates a timestamp from milliseconds since the Unix epoch.
    ///
    /// Returns `None` if the value is out of range.
    #[must_use]
    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self)
    }

    /// Creates a timestamp from whole seconds since the Unix epoch.
    #[must_use]
    pub fn from_secs(secs: i64) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(Self)
    }

    /// Creates a timestamp from fractional seconds since the Unix epoch.
    ///
    /// The value is rounded to the nearest millisecond. Returns `None` for
    /// non-finite or out-of-range input.
    #[must_use]
    pub fn from_secs_f64(secs: f64) -> Option<Self> {
        if !secs.is_finite() {
            return None;
        }
        let millis = (secs * 1000.0).round();
        if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
            return None;
        }
        Self::from_millis(millis as i64)
    }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub fn as_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Whole seconds since the Unix epoch (sub-second part dropped).
    #[must_use]
    pub fn as_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Fractional seconds since the Unix epoch.
    #[must_use]
    pub fn as_secs_f64(&self) -> f64 {
        self.as_millis() as f64 / 1000.0
    }

    /// The underlying `chrono` value.
    #[must_use]
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Renders the canonical file representation (shortest decimal seconds).
    #[must_use]
    pub fn to_wire(&self) -> String {
        self.as_secs_f64().to_string()
    }

    /// Parses the canonical file representation.
    ///
    /// Accepts `-?digits` optionally followed by `.digits`; anything else,
    /// including exponents and surrounding whitespace, is rejected.
    #[must_use]
    pub fn parse_wire(raw: &str) -> Option<Self> {
        let digits = raw.strip_prefix('-').unwrap_or(raw);
        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (digits, None),
        };

        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || !fraction.map_or(true, all_digits) {
            return None;
        }

        raw.parse::<f64>().ok().and_then(Self::from_secs_f64)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.trunc_subsecs(3))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}
