//! Row codec: raw columns to typed records and back.

use serde::Serialize;

use crate::DELIMITER;
use crate::error::{RowError, RowShapeError, ShapeCause};
use crate::schema::{DecodeRecord, EncodeRecord, RECORD_TYPE_KEY, RowSchema};
use crate::value::FieldMap;

/// Columns of one physical line, kept verbatim for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawRow {
    line: usize,
    columns: Vec<String>,
}

impl RawRow {
    /// `line` is the 1-based physical line the row was read from.
    pub fn new(line: usize, columns: Vec<String>) -> Self {
        Self { line, columns }
    }

    /// Split a line on the column delimiter.
    pub fn parse(line: usize, text: &str) -> Self {
        Self::new(line, text.split(DELIMITER).map(str::to_string).collect())
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Column at `position`; a missing column reads as empty.
    pub fn get(&self, position: usize) -> &str {
        self.columns.get(position).map_or("", String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The row as it appeared on the wire.
    pub fn joined(&self) -> String {
        self.columns.join("|")
    }
}

/// Convert every keyed column of `raw` into a [`FieldMap`].
///
/// Stops at the first converter failure; the error keeps what was decoded so far.
pub fn decode_fields<T>(raw: &RawRow, schema: &RowSchema<T>) -> Result<FieldMap, RowShapeError> {
    let mut fields = FieldMap::new();
    for spec in schema.fields() {
        let Some(key) = spec.key else {
            continue;
        };
        match spec.converter.decode(raw.get(spec.position)) {
            Ok(value) => fields.insert_opt(key, value),
            Err(source) => {
                return Err(RowShapeError {
                    record_type: schema.record_type(),
                    raw: raw.clone(),
                    partial: fields,
                    cause: ShapeCause::Field {
                        position: spec.position,
                        key,
                        source,
                    },
                });
            }
        }
    }
    Ok(fields)
}

pub(crate) fn decode_record<T: DecodeRecord>(
    raw: &RawRow,
    schema: &RowSchema<T>,
) -> Result<T, RowShapeError> {
    let fields = decode_fields(raw, schema)?;
    T::from_fields(&fields).map_err(|violation| RowShapeError {
        record_type: schema.record_type(),
        raw: raw.clone(),
        partial: fields,
        cause: violation.into(),
    })
}

/// Decode one row into its typed record.
pub fn decode_row<T: DecodeRecord>(raw: &RawRow, schema: &RowSchema<T>) -> Result<T, RowError> {
    decode_record(raw, schema).map_err(RowError::from)
}

/// Encode one record into a delimited line (without terminator).
///
/// Every position from 0 to the schema's highest one is written, so a column
/// always lands at its declared position even when lower ones are unmapped.
pub fn encode_row<T: EncodeRecord>(row: &T, schema: &RowSchema<T>) -> Result<String, RowError> {
    row.validate().map_err(RowError::InvalidRecord)?;

    let mut fields = row.to_fields();
    if !fields.contains(RECORD_TYPE_KEY) {
        fields.insert(RECORD_TYPE_KEY, schema.record_type().as_str());
    }

    let mut columns = Vec::with_capacity(schema.max_position() + 1);
    for position in 0..=schema.max_position() {
        let column = match schema.at(position) {
            Some(spec) => match spec.key {
                Some(key) => spec.converter.encode(fields.get(key)).map_err(|source| {
                    RowError::FieldEncoding {
                        position,
                        key,
                        source,
                    }
                })?,
                None => String::new(),
            },
            None => String::new(),
        };
        columns.push(column);
    }
    Ok(columns.join("|"))
}
