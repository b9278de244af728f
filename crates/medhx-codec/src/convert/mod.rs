//! Per-type field converters.
//!
//! Each converter turns one raw column into an optional [`FieldValue`] and back.
//! Optionality lives in the converter: an optional field decodes a blank column
//! to `None` and encodes `None` as an empty column, a required field rejects
//! both.
//!
//! | Converter | Wire form | Value |
//! |-----------|-----------|-------|
//! | text | escaped text | `Text` |
//! | code | one of a fixed list | `Text` |
//! | date | `CCYYMMDD` | `Date` |
//! | timestamp | RFC 3339 or `CCYYMMDDHHMMSS` | `Timestamp` (decode only) |
//! | time | `HHMMSS` / `HHMMSSCC` | `Time` |
//! | integer | digits | `Integer` |
//! | compressed UUID | 32 hex characters | `Uuid` |

pub mod code;
pub mod date;
pub mod identifier;
pub mod integer;
pub mod string;
pub mod time;

use crate::error::FieldError;
use crate::value::FieldValue;

pub use string::TextFormat;

/// The conversion applied to one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    /// Free text with escaping and length rules.
    Text(TextFormat),
    /// Member of a fixed code list.
    Code {
        values: &'static [&'static str],
        optional: bool,
    },
    /// `CCYYMMDD` calendar date.
    Date { optional: bool },
    /// Full timestamp, incoming only.
    Timestamp,
    /// `HHMMSS`, or `HHMMSSCC` with centiseconds.
    Time { centisecond: bool, optional: bool },
    /// Unpadded whole number.
    Integer { optional: bool },
    /// UUID with its dashes removed.
    CompressedUuid { optional: bool },
}

impl Converter {
    /// Whether a blank column is acceptable.
    pub fn is_optional(&self) -> bool {
        match self {
            Self::Text(format) => format.optional,
            Self::Code { optional, .. }
            | Self::Date { optional }
            | Self::Time { optional, .. }
            | Self::Integer { optional }
            | Self::CompressedUuid { optional } => *optional,
            Self::Timestamp => false,
        }
    }

    /// Short name of the converter, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Code { .. } => "code",
            Self::Date { .. } => "date",
            Self::Timestamp => "timestamp",
            Self::Time { .. } => "time",
            Self::Integer { .. } => "integer",
            Self::CompressedUuid { .. } => "compressed uuid",
        }
    }

    /// Decode one raw column.
    pub fn decode(&self, raw: &str) -> Result<Option<FieldValue>, FieldError> {
        match self {
            Self::Text(format) => Ok(string::decode(raw, format).map(FieldValue::Text)),
            Self::Code { values, optional } => {
                Ok(code::decode(raw, values, *optional)?.map(FieldValue::from))
            }
            Self::Date { optional } => Ok(date::decode(raw, *optional)?.map(FieldValue::Date)),
            Self::Timestamp => date::decode_timestamp(raw).map(|ts| Some(FieldValue::Timestamp(ts))),
            Self::Time {
                centisecond,
                optional,
            } => Ok(time::decode(raw, *centisecond, *optional)?.map(FieldValue::Time)),
            Self::Integer { optional } => {
                Ok(integer::decode(raw, *optional)?.map(FieldValue::Integer))
            }
            Self::CompressedUuid { optional } => {
                Ok(identifier::decode(raw, *optional)?.map(FieldValue::Uuid))
            }
        }
    }

    /// Encode one value into its raw column.
    pub fn encode(&self, value: Option<&FieldValue>) -> Result<String, FieldError> {
        match self {
            Self::Text(format) => string::encode(text_of(value)?, format),
            Self::Code { values, optional } => code::encode(text_of(value)?, values, *optional),
            Self::Date { optional } => date::encode(value, *optional),
            Self::Timestamp => Err(FieldError::NotEncodable),
            Self::Time {
                centisecond,
                optional,
            } => match value {
                None if *optional => Ok(String::new()),
                None => Err(FieldError::MissingValue),
                Some(FieldValue::Time(time)) => Ok(time::encode(*time, *centisecond)),
                Some(other) => Err(mismatch("time", other)),
            },
            Self::Integer { optional } => match value {
                None if *optional => Ok(String::new()),
                None => Err(FieldError::MissingValue),
                Some(FieldValue::Integer(number)) => Ok(integer::encode(*number)),
                Some(other) => Err(mismatch("integer", other)),
            },
            Self::CompressedUuid { optional } => match value {
                None if *optional => Ok(String::new()),
                None => Err(FieldError::MissingValue),
                Some(FieldValue::Uuid(id)) => Ok(identifier::encode(id)),
                Some(other) => Err(mismatch("uuid", other)),
            },
        }
    }
}

fn text_of(value: Option<&FieldValue>) -> Result<Option<&str>, FieldError> {
    match value {
        None => Ok(None),
        Some(FieldValue::Text(text)) => Ok(Some(text)),
        Some(other) => Err(mismatch("text", other)),
    }
}

fn mismatch(expected: &'static str, found: &FieldValue) -> FieldError {
    FieldError::TypeMismatch {
        expected,
        found: found.kind(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;

    #[test]
    fn test_optionality() {
        assert!(Converter::Date { optional: true }.is_optional());
        assert!(!Converter::Timestamp.is_optional());
        assert!(Converter::Text(TextFormat::optional()).is_optional());
    }

    #[test]
    fn test_encode_rejects_mismatched_values() {
        let converter = Converter::Integer { optional: false };
        assert_eq!(
            converter.encode(Some(&FieldValue::from("12"))),
            Err(FieldError::TypeMismatch {
                expected: "integer",
                found: "text",
            })
        );
        assert_eq!(converter.encode(None), Err(FieldError::MissingValue));
        assert_eq!(
            Converter::Integer { optional: true }.encode(None),
            Ok(String::new())
        );
    }

    #[test]
    fn test_timestamp_has_no_encoder() {
        let value = Converter::Timestamp
            .decode("2025-01-02T03:04:05Z")
            .unwrap()
            .unwrap();
        assert_eq!(
            Converter::Timestamp.encode(Some(&value)),
            Err(FieldError::NotEncodable)
        );
    }

    #[test]
    fn test_time_roundtrip_through_converter() {
        let converter = Converter::Time {
            centisecond: true,
            optional: false,
        };
        let value = converter.decode("12345678").unwrap();
        assert_eq!(
            value,
            Some(FieldValue::Time(
                NaiveTime::from_hms_milli_opt(12, 34, 56, 780).unwrap()
            ))
        );
        assert_eq!(converter.encode(value.as_ref()).unwrap(), "12345678");
    }
}
