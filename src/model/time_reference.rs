use chrono::{DateTime, TimeZone, Utc};
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::shape::{ShapeMatcher, deserialize_object, match_shape};

/// A bound on a time-ordered list, e.g. the recently played tracks.
///
/// Holds a Unix timestamp in whole milliseconds, the resolution of the wire
/// format `{"before": <ms>}` or `{"after": <ms>}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BeforeOrAfterTimestamp {
    Before(i64),
    After(i64),
}

impl BeforeOrAfterTimestamp {
    /// Items played strictly before `milliseconds`.
    pub fn before_millis(milliseconds: i64) -> Self {
        BeforeOrAfterTimestamp::Before(milliseconds)
    }

    /// Items played strictly after `milliseconds`.
    pub fn after_millis(milliseconds: i64) -> Self {
        BeforeOrAfterTimestamp::After(milliseconds)
    }

    /// Items played strictly before `date`, rounded to the nearest millisecond.
    pub fn before_date(date: DateTime<Utc>) -> Self {
        BeforeOrAfterTimestamp::Before(round_millis(date))
    }

    /// Items played strictly after `date`, rounded to the nearest millisecond.
    pub fn after_date(date: DateTime<Utc>) -> Self {
        BeforeOrAfterTimestamp::After(round_millis(date))
    }

    pub fn key(&self) -> &'static str {
        match self {
            BeforeOrAfterTimestamp::Before(_) => "before",
            BeforeOrAfterTimestamp::After(_) => "after",
        }
    }

    pub fn milliseconds(&self) -> i64 {
        match self {
            BeforeOrAfterTimestamp::Before(milliseconds)
            | BeforeOrAfterTimestamp::After(milliseconds) => *milliseconds,
        }
    }

    /// `None` if the timestamp is outside the range chrono can represent.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.milliseconds()).single()
    }

    /// The query parameter this bound is sent as, e.g. `("after", "1484811043508")`.
    pub fn as_query_item(&self) -> (&'static str, String) {
        (self.key(), self.milliseconds().to_string())
    }
}

fn round_millis(date: DateTime<Utc>) -> i64 {
    let millis = date.timestamp_millis();
    if date.timestamp_subsec_nanos() % 1_000_000 >= 500_000 {
        millis + 1
    } else {
        millis
    }
}

fn timestamp(value: &Value) -> Option<i64> {
    match value.as_i64() {
        Some(milliseconds) => Some(milliseconds),
        None => {
            let milliseconds = value.as_f64()?.round();
            if !milliseconds.is_finite()
                || milliseconds < i64::MIN as f64
                || milliseconds >= i64::MAX as f64
            {
                return None;
            }
            Some(milliseconds as i64)
        }
    }
}

fn before(value: &Value) -> Option<BeforeOrAfterTimestamp> {
    timestamp(value).map(BeforeOrAfterTimestamp::Before)
}

fn after(value: &Value) -> Option<BeforeOrAfterTimestamp> {
    timestamp(value).map(BeforeOrAfterTimestamp::After)
}

const SHAPES: [ShapeMatcher<BeforeOrAfterTimestamp>; 2] = [
    ShapeMatcher {
        key: "before",
        description: r#"{"before": <milliseconds>}"#,
        extract: before,
    },
    ShapeMatcher {
        key: "after",
        description: r#"{"after": <milliseconds>}"#,
        extract: after,
    },
];

impl<'de> Deserialize<'de> for BeforeOrAfterTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = deserialize_object(deserializer)?;
        match_shape(&object, &SHAPES)
    }
}

impl Serialize for BeforeOrAfterTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key(), &self.milliseconds())?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for reference in [
            BeforeOrAfterTimestamp::before_millis(1_484_811_043_508),
            BeforeOrAfterTimestamp::after_millis(0),
            BeforeOrAfterTimestamp::after_millis(-1),
            BeforeOrAfterTimestamp::after_millis(i64::MAX),
            BeforeOrAfterTimestamp::before_date(
                Utc.timestamp_opt(1_484_811_043, 508_600_000).unwrap(),
            ),
        ] {
            let encoded = serde_json::to_string(&reference).unwrap();
            let decoded: BeforeOrAfterTimestamp = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, reference);
        }
    }

    #[test]
    fn test_encodes_integer_milliseconds() {
        let reference = BeforeOrAfterTimestamp::after_millis(1_484_811_043_508);
        assert_eq!(
            serde_json::to_string(&reference).unwrap(),
            r#"{"after":1484811043508}"#
        );
        assert_eq!(
            reference.as_query_item(),
            ("after", "1484811043508".to_string())
        );
        assert_eq!(
            reference.date(),
            Utc.timestamp_millis_opt(1_484_811_043_508).single()
        );
    }

    #[test]
    fn test_sub_millisecond_dates_are_rounded_on_construction() {
        let date = Utc.timestamp_opt(1_484_811_043, 508_600_000).unwrap();
        let reference = BeforeOrAfterTimestamp::before_date(date);
        assert_eq!(reference, BeforeOrAfterTimestamp::Before(1_484_811_043_509));

        let date = Utc.timestamp_opt(1_484_811_043, 508_400_000).unwrap();
        assert_eq!(
            BeforeOrAfterTimestamp::after_date(date).milliseconds(),
            1_484_811_043_508
        );
    }

    #[test]
    fn test_decodes_fractional_milliseconds() {
        let reference: BeforeOrAfterTimestamp =
            serde_json::from_str(r#"{"before": 1484811043508.7}"#).unwrap();
        assert_eq!(reference, BeforeOrAfterTimestamp::Before(1_484_811_043_509));
    }

    #[test]
    fn test_both_keys_is_an_error() {
        let error =
            serde_json::from_str::<BeforeOrAfterTimestamp>(r#"{"before": 1, "after": 2}"#)
                .unwrap_err();
        assert!(error.to_string().contains("conflicting keys `before` and `after`"));
    }

    #[test]
    fn test_neither_key_is_an_error() {
        assert!(serde_json::from_str::<BeforeOrAfterTimestamp>(r#"{}"#).is_err());
        assert!(serde_json::from_str::<BeforeOrAfterTimestamp>(r#"{"after": "soon"}"#).is_err());
        assert!(serde_json::from_str::<BeforeOrAfterTimestamp>(r#"{"after": 1e300}"#).is_err());
    }
}
