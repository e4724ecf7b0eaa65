use chrono::{NaiveDate, NaiveDateTime};

use crate::error::FetchError;

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a date bound given as `YYYY-MM-DD` (midnight) or a full timestamp
pub fn parse_date_bound(raw: &str) -> Result<NaiveDateTime, FetchError> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN));
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| FetchError::InvalidDate(raw.to_string()))
}
