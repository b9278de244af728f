//! Position-addressed row schemas.
//!
//! A [`RowSchema`] lists the fields of one row kind by their 0-based column
//! position. Positions need not be contiguous: a column that is retired or
//! reserved is declared without a key so it stays documented, is ignored on
//! decode and is written as an empty placeholder on encode.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use crate::convert::{Converter, TextFormat};
use crate::error::ShapeViolation;
use crate::record::{CodeSet, RecordType, RowKind};
use crate::value::FieldMap;

/// Key of the record-type field every schema carries at position 0.
pub const RECORD_TYPE_KEY: &str = "record_type";

/// One field of a row: where it sits, what it is called and how it converts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub position: usize,
    /// `None` for a reserved column.
    pub key: Option<&'static str>,
    pub converter: Converter,
    pub description: Option<&'static str>,
}

impl FieldSpec {
    pub const fn new(position: usize, key: &'static str, converter: Converter) -> Self {
        Self {
            position,
            key: Some(key),
            converter,
            description: None,
        }
    }

    pub const fn text(position: usize, key: &'static str) -> Self {
        Self::new(position, key, Converter::Text(TextFormat::required()))
    }

    pub const fn optional_text(position: usize, key: &'static str) -> Self {
        Self::new(position, key, Converter::Text(TextFormat::optional()))
    }

    pub const fn code(position: usize, key: &'static str, values: &'static [&'static str]) -> Self {
        Self::new(
            position,
            key,
            Converter::Code {
                values,
                optional: false,
            },
        )
    }

    pub const fn optional_code(
        position: usize,
        key: &'static str,
        values: &'static [&'static str],
    ) -> Self {
        Self::new(
            position,
            key,
            Converter::Code {
                values,
                optional: true,
            },
        )
    }

    /// Code field whose list comes from a [`CodeSet`] enum.
    pub fn code_set<C: CodeSet>(position: usize, key: &'static str) -> Self {
        Self::code(position, key, C::CODES)
    }

    pub fn optional_code_set<C: CodeSet>(position: usize, key: &'static str) -> Self {
        Self::optional_code(position, key, C::CODES)
    }

    pub const fn date(position: usize, key: &'static str) -> Self {
        Self::new(position, key, Converter::Date { optional: false })
    }

    pub const fn optional_date(position: usize, key: &'static str) -> Self {
        Self::new(position, key, Converter::Date { optional: true })
    }

    pub const fn timestamp(position: usize, key: &'static str) -> Self {
        Self::new(position, key, Converter::Timestamp)
    }

    pub const fn time(position: usize, key: &'static str, centisecond: bool) -> Self {
        Self::new(
            position,
            key,
            Converter::Time {
                centisecond,
                optional: false,
            },
        )
    }

    pub const fn integer(position: usize, key: &'static str) -> Self {
        Self::new(position, key, Converter::Integer { optional: false })
    }

    pub const fn optional_integer(position: usize, key: &'static str) -> Self {
        Self::new(position, key, Converter::Integer { optional: true })
    }

    pub const fn uuid(position: usize, key: &'static str) -> Self {
        Self::new(position, key, Converter::CompressedUuid { optional: false })
    }

    pub const fn optional_uuid(position: usize, key: &'static str) -> Self {
        Self::new(position, key, Converter::CompressedUuid { optional: true })
    }

    /// A retired or reserved column.
    pub const fn reserved(position: usize, description: &'static str) -> Self {
        Self {
            position,
            key: None,
            converter: Converter::Text(TextFormat::optional()),
            description: Some(description),
        }
    }

    #[must_use]
    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Set the maximum length of a text field.
    #[must_use]
    pub const fn max_length(mut self, max: usize) -> Self {
        if let Converter::Text(format) = self.converter {
            self.converter = Converter::Text(format.max_length(max));
        }
        self
    }

    /// Set the minimum length of a required text field.
    #[must_use]
    pub const fn min_length(mut self, min: usize) -> Self {
        if let Converter::Text(format) = self.converter {
            self.converter = Converter::Text(format.min_length(min));
        }
        self
    }

    /// Truncate over-long text to the maximum instead of failing.
    #[must_use]
    pub const fn truncating(mut self) -> Self {
        if let Converter::Text(format) = self.converter {
            self.converter = Converter::Text(format.truncate());
        }
        self
    }

    /// Label used in diagnostics: the key, or the description of a reserved column.
    pub fn label(&self) -> &'static str {
        self.key.or(self.description).unwrap_or("reserved")
    }
}

/// Turn decoded fields into a typed record, or say why they cannot be one.
pub trait DecodeRecord: Sized {
    fn from_fields(fields: &FieldMap) -> Result<Self, ShapeViolation>;
}

/// Turn a typed record into fields for encoding.
pub trait EncodeRecord {
    /// Record-level checks that run before any field is encoded.
    fn validate(&self) -> Result<(), ShapeViolation> {
        Ok(())
    }

    fn to_fields(&self) -> FieldMap;
}

/// Field catalog of one row kind, bound to the record type it decodes into.
#[derive(Debug)]
pub struct RowSchema<T> {
    kind: RowKind,
    record_type: RecordType,
    fields: Vec<FieldSpec>,
    by_position: BTreeMap<usize, usize>,
    _record: PhantomData<fn() -> T>,
}

impl<T> RowSchema<T> {
    /// Build a schema; the record-type field is inserted at position 0.
    ///
    /// # Panics
    ///
    /// Panics if two specs share a position or key, or a spec claims position 0.
    /// Schemas are static tables, so this is a programming error.
    pub fn new(kind: RowKind, record_type: RecordType, fields: Vec<FieldSpec>) -> Self {
        let mut all = Vec::with_capacity(fields.len() + 1);
        all.push(
            FieldSpec::code(0, RECORD_TYPE_KEY, record_type.codes()).describe("record type"),
        );
        all.extend(fields);
        all.sort_by_key(|spec| spec.position);

        let mut by_position = BTreeMap::new();
        for (index, spec) in all.iter().enumerate() {
            let previous = by_position.insert(spec.position, index);
            assert!(
                previous.is_none(),
                "{record_type} {kind} schema declares position {} twice",
                spec.position
            );
            if let Some(key) = spec.key {
                let clashes = all.iter().filter(|other| other.key == Some(key)).count();
                assert!(clashes == 1, "{record_type} {kind} schema declares key '{key}' twice");
            }
        }

        Self {
            kind,
            record_type,
            fields: all,
            by_position,
            _record: PhantomData,
        }
    }

    pub fn kind(&self) -> RowKind {
        self.kind
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    /// Every spec, ordered by position, record type first.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Spec declared at `position`, if any.
    pub fn at(&self, position: usize) -> Option<&FieldSpec> {
        self.by_position
            .get(&position)
            .map(|&index| &self.fields[index])
    }

    /// Spec with the given key.
    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.key == Some(key))
    }

    /// Highest declared position; an encoded row has this many plus one columns.
    pub fn max_position(&self) -> usize {
        self.by_position.keys().next_back().copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe;

    fn sparse() -> RowSchema<Probe> {
        RowSchema::new(
            RowKind::Detail,
            RecordType::Detail,
            vec![
                FieldSpec::text(3, "name").max_length(4).truncating(),
                FieldSpec::reserved(2, "retired"),
                FieldSpec::optional_integer(1, "count"),
            ],
        )
    }

    #[test]
    fn test_record_type_is_position_zero() {
        let schema = sparse();
        let first = &schema.fields()[0];
        assert_eq!(first.position, 0);
        assert_eq!(first.key, Some(RECORD_TYPE_KEY));
        assert_eq!(
            first.converter,
            Converter::Code {
                values: &["DTL"],
                optional: false,
            }
        );
    }

    #[test]
    fn test_lookup() {
        let schema = sparse();
        assert_eq!(schema.max_position(), 3);
        assert_eq!(schema.at(2).map(FieldSpec::label), Some("retired"));
        assert_eq!(schema.at(2).and_then(|spec| spec.key), None);
        assert_eq!(schema.field("count").map(|spec| spec.position), Some(1));
        assert!(schema.at(4).is_none());
        let positions: Vec<_> = schema.fields().iter().map(|spec| spec.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_text_modifiers() {
        let spec = FieldSpec::text(1, "name").max_length(4).truncating();
        assert_eq!(
            spec.converter,
            Converter::Text(TextFormat::required().max_length(4).truncate())
        );
        // Text modifiers leave other converters alone.
        let spec = FieldSpec::integer(1, "count").max_length(4);
        assert_eq!(spec.converter, Converter::Integer { optional: false });
    }

    #[test]
    #[should_panic(expected = "position 1 twice")]
    fn test_duplicate_position_panics() {
        let _ = RowSchema::<Probe>::new(
            RowKind::Header,
            RecordType::Header,
            vec![FieldSpec::text(1, "a"), FieldSpec::text(1, "b")],
        );
    }

    #[test]
    #[should_panic(expected = "position 0 twice")]
    fn test_position_zero_is_taken() {
        let _ = RowSchema::<Probe>::new(
            RowKind::Header,
            RecordType::Header,
            vec![FieldSpec::text(0, "a")],
        );
    }
}
