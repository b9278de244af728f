//! Date and timestamp fields.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};

use crate::error::FieldError;
use crate::value::FieldValue;

/// Wire format of date fields.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Decode `CCYYMMDD`; blank is `None` when optional.
pub fn decode(raw: &str, optional: bool) -> Result<Option<NaiveDate>, FieldError> {
    if raw.len() != 8 {
        if optional && raw.is_empty() {
            return Ok(None);
        }
        return Err(invalid_date(raw));
    }
    parse_compact(raw).map(Some).ok_or_else(|| invalid_date(raw))
}

/// Encode a date, a timestamp's UTC date, or a `CCYY-MM-DD` / `CCYYMMDD` text.
pub fn encode(value: Option<&FieldValue>, optional: bool) -> Result<String, FieldError> {
    match value {
        None => missing(optional),
        Some(FieldValue::Date(date)) => Ok(date.format(DATE_FORMAT).to_string()),
        Some(FieldValue::Timestamp(timestamp)) => {
            Ok(timestamp.date_naive().format(DATE_FORMAT).to_string())
        }
        Some(FieldValue::Text(text)) if text.is_empty() => missing(optional),
        Some(FieldValue::Text(text)) => {
            let compact = text.replace('-', "");
            match parse_compact(&compact) {
                Some(_) => Ok(compact),
                None => Err(invalid_date(text)),
            }
        }
        Some(other) => Err(FieldError::TypeMismatch {
            expected: "date",
            found: other.kind(),
        }),
    }
}

/// The instant a calendar date starts at, in UTC.
pub fn to_utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Decode a full timestamp.
///
/// Accepts RFC 3339 (offsets are honoured), `CCYY-MM-DD[T| ]HH:MM:SS[.fff]`,
/// `CCYYMMDDHHMMSS[CC]` and bare dates; forms without an offset are read as UTC.
pub fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, FieldError> {
    let value = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(to_utc_midnight(date));
    }
    if value.bytes().all(|b| b.is_ascii_digit()) {
        let parsed = match value.len() {
            8 => parse_compact(value).map(to_utc_midnight),
            14 => parse_compact_datetime(value),
            16 => parse_compact_datetime(&value[..14]).and_then(|timestamp| {
                let centis: i64 = value[14..].parse().ok()?;
                Some(timestamp + TimeDelta::milliseconds(centis * 10))
            }),
            _ => None,
        };
        if let Some(timestamp) = parsed {
            return Ok(timestamp);
        }
    }
    Err(FieldError::InvalidTimestamp {
        value: raw.to_string(),
    })
}

fn parse_compact(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = value[0..4].parse().ok()?;
    let month = value[4..6].parse().ok()?;
    let day = value[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_compact_datetime(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn missing(optional: bool) -> Result<String, FieldError> {
    if optional {
        Ok(String::new())
    } else {
        Err(FieldError::MissingValue)
    }
}

fn invalid_date(value: &str) -> FieldError {
    FieldError::InvalidDate {
        value: value.to_string(),
    }
}
