use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Parse an ISO-8601 timestamp
///
/// Accepts RFC 3339 (`2024-05-01T10:00:00Z`, `+09:00` offsets), a naive
/// `YYYY-MM-DDTHH:MM[:SS]` taken as UTC, or a bare date at midnight UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    parse_date(value)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Optional date where `null` and `""` both mean "not set"
pub fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_date(&raw)
            .or_else(|| parse_timestamp(&raw).map(|ts| ts.date_naive()))
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw))),
    }
}

pub fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

pub fn lenient_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_timestamp_variants() {
        let zulu = parse_timestamp("2024-05-01T10:30:00Z").unwrap();
        assert_eq!(zulu.hour(), 10);

        let offset = parse_timestamp("2024-05-01T10:30:00+09:00").unwrap();
        assert_eq!(offset.hour(), 1, "offset timestamps are normalised to UTC");

        let naive = parse_timestamp("2024-05-01T10:30").unwrap();
        assert_eq!(naive.minute(), 30);

        let date_only = parse_timestamp("2024-05-01").unwrap();
        assert_eq!(date_only.day(), 1);
        assert_eq!(date_only.hour(), 0);

        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_parse_date_rejects_other_formats() {
        assert!(parse_date("2024-02-30").is_none());
        assert!(parse_date("2024/02/01").is_none());
        assert_eq!(parse_date(" 2024-02-01 "), NaiveDate::from_ymd_opt(2024, 2, 1));
    }
}
