//! Time-of-day fields.

use chrono::{NaiveTime, Timelike};

use crate::error::FieldError;

/// Decode `HHMMSS`, or `HHMMSSCC` when `centisecond` is set.
///
/// Centiseconds become milliseconds (`CC * 10`). Blank is `None` when optional.
pub fn decode(raw: &str, centisecond: bool, optional: bool) -> Result<Option<NaiveTime>, FieldError> {
    let expected_len = if centisecond { 8 } else { 6 };
    if raw.is_empty() && optional {
        return Ok(None);
    }
    if raw.len() != expected_len || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(raw, centisecond));
    }

    let part = |range: std::ops::Range<usize>| raw[range].parse::<u32>().unwrap_or_default();
    let centis = if centisecond { part(6..8) } else { 0 };
    NaiveTime::from_hms_milli_opt(part(0..2), part(2..4), part(4..6), centis * 10)
        .map(Some)
        .ok_or_else(|| invalid(raw, centisecond))
}

/// Encode as `HHMMSS[CC]`; sub-centisecond precision is dropped.
pub fn encode(time: NaiveTime, centisecond: bool) -> String {
    let hms = time.format("%H%M%S").to_string();
    if centisecond {
        let centis = (time.nanosecond() / 10_000_000).min(99);
        format!("{hms}{centis:02}")
    } else {
        hms
    }
}

fn invalid(value: &str, centisecond: bool) -> FieldError {
    FieldError::InvalidTime {
        value: value.to_string(),
        expected: if centisecond { "HHMMSSCC" } else { "HHMMSS" },
    }
}
