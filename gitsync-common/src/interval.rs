//! Polling interval parsing.
//!
//! Configuration accepts an interval either as a duration string with
//! unit suffixes (`"10s"`, `"60m"`, `"1h30m"`) or as a bare number of
//! nanoseconds. Serialization always emits the compact string form.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntervalError {
    #[error("empty duration")]
    Empty,
    #[error("invalid duration '{0}'")]
    Invalid(String),
    #[error("unknown duration unit '{unit}' in '{input}'")]
    UnknownUnit { input: String, unit: String },
    #[error("negative duration '{0}'")]
    Negative(String),
}

/// A non-negative polling interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Interval(Duration);

impl Interval {
    pub const fn new(duration: Duration) -> Self {
        Interval(duration)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Interval(Duration::from_secs(secs))
    }

    pub fn duration(&self) -> Duration {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Duration> for Interval {
    fn from(duration: Duration) -> Self {
        Interval(duration)
    }
}

const UNITS: &[(&str, u64)] = &[
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60 * 1_000_000_000),
    ("h", 3_600 * 1_000_000_000),
];

fn unit_nanos(unit: &str) -> Option<u64> {
    UNITS.iter().find(|(name, _)| *name == unit).map(|(_, n)| *n)
}

/// Parse a duration string: one or more `<number><unit>` segments,
/// where the number may carry a decimal fraction.
pub fn parse_duration(input: &str) -> Result<Duration, IntervalError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(IntervalError::Empty);
    }
    if s.starts_with('-') {
        return Err(IntervalError::Negative(input.to_string()));
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total_nanos = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        if digits == 0 {
            return Err(IntervalError::Invalid(input.to_string()));
        }
        let value: f64 = rest[..digits]
            .parse()
            .map_err(|_| IntervalError::Invalid(input.to_string()))?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        if unit_len == 0 {
            return Err(IntervalError::Invalid(input.to_string()));
        }
        let unit = &rest[..unit_len];
        let nanos = unit_nanos(unit).ok_or_else(|| IntervalError::UnknownUnit {
            input: input.to_string(),
            unit: unit.to_string(),
        })?;
        rest = &rest[unit_len..];

        total_nanos += value * nanos as f64;
    }

    Ok(Duration::from_nanos(total_nanos as u64))
}

/// Render a duration compactly: the largest non-zero units, `"0s"` for
/// zero.
pub fn format_duration(duration: Duration) -> String {
    if duration.is_zero() {
        return "0s".to_string();
    }

    let mut nanos = duration.as_nanos() as u64;
    let mut out = String::new();
    for (name, unit) in [
        ("h", 3_600 * 1_000_000_000u64),
        ("m", 60 * 1_000_000_000),
        ("s", 1_000_000_000),
        ("ms", 1_000_000),
        ("us", 1_000),
        ("ns", 1),
    ] {
        let count = nanos / unit;
        if count > 0 {
            out.push_str(&count.to_string());
            out.push_str(name);
            nanos -= count * unit;
        }
    }
    out
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.0))
    }
}

impl FromStr for Interval {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s).map(Interval)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntervalInput {
    Nanos(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match IntervalInput::deserialize(deserializer)? {
            IntervalInput::Nanos(nanos) => {
                if nanos < 0.0 {
                    return Err(D::Error::custom(IntervalError::Negative(nanos.to_string())));
                }
                Ok(Interval(Duration::from_nanos(nanos as u64)))
            }
            IntervalInput::Text(s) => s.parse().map_err(D::Error::custom),
        }
    }
}

impl Serialize for Interval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_units() {
        assert_eq!(Duration::from_secs(10), parse_duration("10s").unwrap());
        assert_eq!(Duration::from_secs(3_600), parse_duration("60m").unwrap());
        assert_eq!(Duration::from_secs(6 * 3_600), parse_duration("6h").unwrap());
        assert_eq!(Duration::from_millis(250), parse_duration("250ms").unwrap());
        assert_eq!(Duration::from_nanos(42), parse_duration("42ns").unwrap());
    }

    #[test]
    fn parses_compound_and_fractional() {
        assert_eq!(Duration::from_secs(5_400), parse_duration("1h30m").unwrap());
        assert_eq!(Duration::from_millis(1_500), parse_duration("1.5s").unwrap());
        assert_eq!(
            Duration::from_secs(3_661),
            parse_duration("1h1m1s").unwrap(),
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(Err(IntervalError::Empty), parse_duration(""));
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("-5s").is_err());
        assert!(parse_duration("10parsecs").is_err());
    }

    #[test]
    fn formats_compactly() {
        assert_eq!("0s", format_duration(Duration::ZERO));
        assert_eq!("10s", format_duration(Duration::from_secs(10)));
        assert_eq!("1h30m", format_duration(Duration::from_secs(5_400)));
        assert_eq!("6h", format_duration(Duration::from_secs(6 * 3_600)));
        assert_eq!("1s500ms", format_duration(Duration::from_millis(1_500)));
    }

    #[test]
    fn deserializes_string_and_nanos() {
        let from_text: Interval = serde_json::from_str(r#""10s""#).unwrap();
        assert_eq!(Interval::from_secs(10), from_text);

        let from_nanos: Interval = serde_json::from_str("1000000000").unwrap();
        assert_eq!(Interval::from_secs(1), from_nanos);

        assert!(serde_json::from_str::<Interval>("-1").is_err());
        assert!(serde_json::from_str::<Interval>(r#""nope""#).is_err());
    }

    #[test]
    fn serializes_to_string_form() {
        let interval = Interval::from_secs(90);
        assert_eq!(r#""1m30s""#, serde_json::to_string(&interval).unwrap());
    }
}
