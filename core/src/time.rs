//! Graph timestamp parsing.
//!
//! Event times come back as `2011-03-26T14:00:00` with no offset, while
//! `updated_time` carries `+0000`. Both are normalized to `DateTime<Utc>`; a
//! missing offset is read as UTC, which is not necessarily the wall-clock
//! zone the event was created in.
//!
//! The module doubles as a `#[serde(with = "crate::time")]` adapter.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serializer};

const OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";
const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a Graph timestamp, with or without an offset, into UTC.
pub fn parse_graph_time(input: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    if let Ok(time) = DateTime::parse_from_str(input, OFFSET_FORMAT) {
        return Ok(time.with_timezone(&Utc));
    }
    if let Ok(time) = DateTime::parse_from_rfc3339(input) {
        return Ok(time.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(input, NAIVE_FORMAT).map(|naive| naive.and_utc())
}

/// Render a timestamp the way the Graph API writes `updated_time`.
pub fn format_graph_time(time: &DateTime<Utc>) -> String {
    time.format(OFFSET_FORMAT).to_string()
}

pub fn serialize<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_graph_time(time))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_graph_time(&raw)
        .map_err(|e| de::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn naive_timestamp_is_utc() {
        let parsed = parse_graph_time("2011-03-26T14:00:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2011, 3, 26, 14, 0, 0).unwrap());
        assert_eq!(format_graph_time(&parsed), "2011-03-26T14:00:00+0000");
    }

    #[test]
    fn explicit_zero_offset() {
        let parsed = parse_graph_time("2011-03-30T14:30:28+0000").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2011, 3, 30, 14, 30, 28).unwrap());
    }

    #[test]
    fn non_zero_offset_is_normalized() {
        let parsed = parse_graph_time("2011-03-30T09:30:00-0500").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2011, 3, 30, 14, 30, 0).unwrap());
    }

    #[test]
    fn rfc3339_is_accepted() {
        let parsed = parse_graph_time("2011-03-30T14:30:00Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2011, 3, 30, 14, 30, 0).unwrap());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_graph_time("next tuesday").is_err());
        assert!(parse_graph_time("2011-03-30").is_err());
    }
}
