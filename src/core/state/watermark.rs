//! Watermark model for incremental extraction
//!
//! A watermark is the highest key value of a source table that has been
//! durably written to storage. The next run selects only rows above it.

use crate::domain::ids::SourceId;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of a watermark
///
/// Ordering follows declaration order first, so [`WatermarkValue::Minimum`]
/// compares below every concrete value. Integer and timestamp values are
/// never mixed for one source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum WatermarkValue {
    /// Nothing has been extracted yet; every row qualifies
    Minimum,
    /// Integer key (any PostgreSQL integer width)
    Integer(i64),
    /// Timestamp key, normalized to UTC
    Timestamp(DateTime<Utc>),
}

impl WatermarkValue {
    /// Returns true for the "nothing extracted yet" value
    pub fn is_minimum(&self) -> bool {
        matches!(self, Self::Minimum)
    }

    /// Checkpoint text form: decimal digits, or RFC 3339 with microseconds
    ///
    /// Returns `None` for [`WatermarkValue::Minimum`], which is never persisted.
    pub fn encode(&self) -> Option<String> {
        match self {
            Self::Minimum => None,
            Self::Integer(v) => Some(v.to_string()),
            Self::Timestamp(ts) => Some(ts.to_rfc3339_opts(SecondsFormat::Micros, true)),
        }
    }

    /// Parses the checkpoint text form
    ///
    /// Integers are tried first, then RFC 3339 timestamps (any offset,
    /// converted to UTC). Anything else, including empty text, is rejected.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err("watermark value is empty".to_string());
        }
        if let Ok(v) = raw.parse::<i64>() {
            return Ok(Self::Integer(v));
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|ts| Self::Timestamp(ts.with_timezone(&Utc)))
            .map_err(|_| format!("'{raw}' is neither an integer nor an RFC 3339 timestamp"))
    }
}

impl fmt::Display for WatermarkValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.encode() {
            Some(text) => f.write_str(&text),
            None => f.write_str("<minimum>"),
        }
    }
}

/// Watermark of one source table
///
/// # Examples
///
/// ```
/// use highwater::core::state::watermark::{Watermark, WatermarkValue};
/// use highwater::domain::ids::SourceId;
///
/// let source = SourceId::new("public.sales").unwrap();
/// let initial = Watermark::initial(source);
/// assert!(initial.value.is_minimum());
///
/// let advanced = initial.advanced_to(WatermarkValue::Integer(250));
/// assert_eq!(advanced.value, WatermarkValue::Integer(250));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watermark {
    /// Table this watermark belongs to
    pub source: SourceId,

    /// Highest key value durably written
    pub value: WatermarkValue,
}

impl Watermark {
    /// Creates a watermark with an explicit value
    pub fn new(source: SourceId, value: WatermarkValue) -> Self {
        Self { source, value }
    }

    /// Watermark of a source that has never been extracted
    pub fn initial(source: SourceId) -> Self {
        Self::new(source, WatermarkValue::Minimum)
    }

    /// Returns true if nothing has been extracted yet
    pub fn is_initial(&self) -> bool {
        self.value.is_minimum()
    }

    /// Watermark after persisting rows whose largest key is `candidate`
    ///
    /// Never moves backwards: the result is the larger of the two values.
    pub fn advanced_to(&self, candidate: WatermarkValue) -> Self {
        let value = if candidate > self.value {
            candidate
        } else {
            self.value.clone()
        };
        Self::new(self.source.clone(), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn source() -> SourceId {
        SourceId::new("public.sales").unwrap()
    }

    #[test]
    fn test_minimum_sorts_below_everything() {
        assert!(WatermarkValue::Minimum < WatermarkValue::Integer(i64::MIN));
        let epoch = Utc.timestamp_opt(0, 0).unwrap();
        assert!(WatermarkValue::Minimum < WatermarkValue::Timestamp(epoch));
    }

    #[test]
    fn test_advanced_to_never_regresses() {
        let wm = Watermark::new(source(), WatermarkValue::Integer(100));

        assert_eq!(
            wm.advanced_to(WatermarkValue::Integer(150)).value,
            WatermarkValue::Integer(150)
        );
        assert_eq!(
            wm.advanced_to(WatermarkValue::Integer(90)).value,
            WatermarkValue::Integer(100)
        );
    }

    #[test]
    fn test_initial_watermark() {
        let wm = Watermark::initial(source());
        assert!(wm.is_initial());
        assert_eq!(wm.value.encode(), None);
        assert_eq!(wm.value.to_string(), "<minimum>");
    }

    #[test]
    fn test_encode_timestamp_is_utc_with_micros() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(
            WatermarkValue::Timestamp(ts).encode().as_deref(),
            Some("2024-03-01T12:30:00.000000Z")
        );
    }

    #[test]
    fn test_parse_timestamp_with_offset_normalizes_to_utc() {
        let parsed = WatermarkValue::parse("2024-03-01T14:30:00+02:00").unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(parsed, WatermarkValue::Timestamp(expected));
    }

    #[test_case("42", WatermarkValue::Integer(42) ; "positive integer")]
    #[test_case(" -7 ", WatermarkValue::Integer(-7) ; "negative integer with spaces")]
    #[test_case("0", WatermarkValue::Integer(0) ; "zero is a real value")]
    fn test_parse_integer(raw: &str, expected: WatermarkValue) {
        assert_eq!(WatermarkValue::parse(raw).unwrap(), expected);
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "blank")]
    #[test_case("abc" ; "text")]
    #[test_case("12.5" ; "fraction")]
    #[test_case("2024-13-01T00:00:00Z" ; "bad month")]
    fn test_parse_rejects(raw: &str) {
        assert!(WatermarkValue::parse(raw).is_err());
    }
}
