//! Decoded field values.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ShapeViolation;
use crate::record::CodeSet;

/// A single converted field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Free text, already unescaped and trimmed.
    Text(String),
    /// Calendar date (`CCYYMMDD` on the wire).
    Date(NaiveDate),
    /// Full instant.
    Timestamp(DateTime<Utc>),
    /// Time of day (`HHMMSS` or `HHMMSSCC` on the wire).
    Time(NaiveTime),
    /// Whole number.
    Integer(i64),
    /// Identifier (compressed to 32 hex characters on the wire).
    Uuid(Uuid),
}

impl FieldValue {
    /// Name of the variant, used in type-mismatch messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Date(_) => "date",
            Self::Timestamp(_) => "timestamp",
            Self::Time(_) => "time",
            Self::Integer(_) => "integer",
            Self::Uuid(_) => "uuid",
        }
    }

    /// Borrow the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Date(value) => write!(f, "{value}"),
            Self::Timestamp(value) => write!(f, "{}", value.to_rfc3339()),
            Self::Time(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Uuid(value) => write!(f, "{value}"),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<NaiveTime> for FieldValue {
    fn from(value: NaiveTime) -> Self {
        Self::Time(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

/// Keyed field values of one row.
///
/// Decoding fills a `FieldMap` field by field; the record's shape validator then
/// turns it into a typed record. A key that is absent means the field was blank
/// and optional, or was never mapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldMap {
    values: BTreeMap<&'static str, FieldValue>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous one.
    pub fn insert(&mut self, key: &'static str, value: impl Into<FieldValue>) {
        self.values.insert(key, value.into());
    }

    /// Insert a value when present; `None` leaves the key absent.
    pub fn insert_opt<V: Into<FieldValue>>(&mut self, key: &'static str, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: &'static str, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder-style [`insert_opt`](Self::insert_opt).
    #[must_use]
    pub fn with_opt<V: Into<FieldValue>>(mut self, key: &'static str, value: Option<V>) -> Self {
        self.insert_opt(key, value);
        self
    }

    /// Insert a code-list member as its wire code.
    #[must_use]
    pub fn with_code<C: CodeSet>(self, key: &'static str, value: Option<C>) -> Self {
        self.with_opt(key, value.map(CodeSet::code))
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.values.iter().map(|(key, value)| (*key, value))
    }

    fn required(&self, key: &'static str) -> Result<&FieldValue, ShapeViolation> {
        self.get(key).ok_or(ShapeViolation::Missing { key })
    }

    pub fn text(&self, key: &'static str) -> Result<String, ShapeViolation> {
        require(key, self.opt_text(key)?)
    }

    pub fn opt_text(&self, key: &'static str) -> Result<Option<String>, ShapeViolation> {
        self.typed(key, "text", |value| match value {
            FieldValue::Text(text) => Some(text.clone()),
            _ => None,
        })
    }

    /// Required text that must also be non-empty.
    pub fn non_empty_text(&self, key: &'static str) -> Result<String, ShapeViolation> {
        let text = self.text(key)?;
        if text.is_empty() {
            return Err(ShapeViolation::invalid(key, "must not be empty"));
        }
        Ok(text)
    }

    pub fn code<C: CodeSet>(&self, key: &'static str) -> Result<C, ShapeViolation> {
        require(key, self.opt_code(key)?)
    }

    pub fn opt_code<C: CodeSet>(&self, key: &'static str) -> Result<Option<C>, ShapeViolation> {
        match self.opt_text(key)? {
            None => Ok(None),
            Some(code) => C::from_code(&code)
                .map(Some)
                .ok_or_else(|| ShapeViolation::invalid(key, format!("unknown code '{code}'"))),
        }
    }

    pub fn date(&self, key: &'static str) -> Result<NaiveDate, ShapeViolation> {
        require(key, self.opt_date(key)?)
    }

    pub fn opt_date(&self, key: &'static str) -> Result<Option<NaiveDate>, ShapeViolation> {
        self.typed(key, "date", |value| match value {
            FieldValue::Date(date) => Some(*date),
            _ => None,
        })
    }

    pub fn timestamp(&self, key: &'static str) -> Result<DateTime<Utc>, ShapeViolation> {
        let value = self.required(key)?;
        match value {
            FieldValue::Timestamp(timestamp) => Ok(*timestamp),
            other => Err(wrong_type(key, "timestamp", other)),
        }
    }

    pub fn time(&self, key: &'static str) -> Result<NaiveTime, ShapeViolation> {
        let value = self.required(key)?;
        match value {
            FieldValue::Time(time) => Ok(*time),
            other => Err(wrong_type(key, "time", other)),
        }
    }

    pub fn integer(&self, key: &'static str) -> Result<i64, ShapeViolation> {
        require(key, self.opt_integer(key)?)
    }

    pub fn opt_integer(&self, key: &'static str) -> Result<Option<i64>, ShapeViolation> {
        self.typed(key, "integer", |value| match value {
            FieldValue::Integer(number) => Some(*number),
            _ => None,
        })
    }

    /// Integer that must fit a non-negative count.
    pub fn count(&self, key: &'static str) -> Result<u32, ShapeViolation> {
        require(key, self.opt_count(key)?)
    }

    pub fn opt_count(&self, key: &'static str) -> Result<Option<u32>, ShapeViolation> {
        self.opt_integer(key)?
            .map(|number| {
                u32::try_from(number)
                    .map_err(|_| ShapeViolation::invalid(key, format!("{number} is not a count")))
            })
            .transpose()
    }

    pub fn uuid(&self, key: &'static str) -> Result<Uuid, ShapeViolation> {
        require(key, self.opt_uuid(key)?)
    }

    pub fn opt_uuid(&self, key: &'static str) -> Result<Option<Uuid>, ShapeViolation> {
        self.typed(key, "uuid", |value| match value {
            FieldValue::Uuid(id) => Some(*id),
            _ => None,
        })
    }

    fn typed<T>(
        &self,
        key: &'static str,
        expected: &'static str,
        extract: impl FnOnce(&FieldValue) -> Option<T>,
    ) -> Result<Option<T>, ShapeViolation> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => extract(value)
                .map(Some)
                .ok_or_else(|| wrong_type(key, expected, value)),
        }
    }
}

fn require<T>(key: &'static str, value: Option<T>) -> Result<T, ShapeViolation> {
    value.ok_or(ShapeViolation::Missing { key })
}

fn wrong_type(key: &'static str, expected: &'static str, found: &FieldValue) -> ShapeViolation {
    ShapeViolation::WrongType {
        key,
        expected,
        found: found.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessors() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let fields = FieldMap::new()
            .with("name", "Ada")
            .with("born", date)
            .with("count", 3_i64)
            .with_opt("missing", None::<String>);

        assert_eq!(fields.text("name").unwrap(), "Ada");
        assert_eq!(fields.date("born").unwrap(), date);
        assert_eq!(fields.count("count").unwrap(), 3);
        assert_eq!(fields.opt_text("missing").unwrap(), None);
        assert!(!fields.contains("missing"));
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn test_shape_violations() {
        let fields = FieldMap::new()
            .with("name", "")
            .with("count", -1_i64);

        assert_eq!(
            fields.text("absent"),
            Err(ShapeViolation::Missing { key: "absent" })
        );
        assert_eq!(
            fields.date("name"),
            Err(ShapeViolation::WrongType {
                key: "name",
                expected: "date",
                found: "text",
            })
        );
        assert!(matches!(
            fields.non_empty_text("name"),
            Err(ShapeViolation::Invalid { key: "name", .. })
        ));
        assert!(fields.count("count").is_err());
    }
}
