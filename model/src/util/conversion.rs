use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use hbnb_error::{Error, Result};
use serde_json::Value as JsonValue;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses an ISO-8601 timestamp. Text without an offset is read as UTC.
pub fn parse_timestamp(field: &str, value: &JsonValue) -> Result<DateTime<Utc>> {
    let text = match value.as_str() {
        Some(text) => text,
        None => {
            return Err(Error::TimestampType {
                field: field.to_owned(),
            })
        }
    };

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    let mut last_err = None;
    for format in NAIVE_FORMATS {
        match NaiveDateTime::parse_from_str(text, format) {
            Ok(naive) => return Ok(Utc.from_utc_datetime(&naive)),
            Err(err) => last_err = Some(err),
        }
    }

    match last_err {
        Some(source) => Err(Error::Parse {
            field: field.to_owned(),
            value: text.to_owned(),
            source,
        }),
        None => Err(Error::TimestampType {
            field: field.to_owned(),
        }),
    }
}

/// Full-precision ISO-8601, so parsing it back yields an equal timestamp.
pub fn timestamp_to_iso(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}
