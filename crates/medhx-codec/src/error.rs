//! Error types for field, row and file operations.
//!
//! Errors nest from the innermost cause outwards:
//! - [`FieldError`]: a single converter rejected a value
//! - [`ShapeViolation`]: a decoded or outgoing record is structurally invalid
//! - [`RowError`]: a row could not be decoded or encoded
//! - [`CodecError`]: a file could not be parsed or serialized

use thiserror::Error;

use crate::record::{RecordType, RowKind};
use crate::row::RawRow;
use crate::value::FieldMap;

/// A single field's conversion failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// A required value is absent or blank.
    #[error("missing required value")]
    MissingValue,

    /// Value is not a member of the field's code list.
    #[error("invalid code '{value}' (expected one of {allowed})")]
    InvalidCode { value: String, allowed: String },

    /// Date is not `CCYYMMDD`.
    #[error("invalid date '{value}' (expected CCYYMMDD)")]
    InvalidDate { value: String },

    /// Timestamp could not be parsed.
    #[error("invalid timestamp '{value}'")]
    InvalidTimestamp { value: String },

    /// Time has the wrong length or out-of-range components.
    #[error("invalid time '{value}' (expected {expected})")]
    InvalidTime {
        value: String,
        expected: &'static str,
    },

    /// Integer field is not numeric.
    #[error("invalid integer '{value}'")]
    InvalidInteger { value: String },

    /// Identifier is not 32 hexadecimal characters.
    #[error("invalid compressed UUID '{value}'")]
    InvalidUuid { value: String },

    /// Outgoing value is shorter than the field minimum.
    #[error("field too short: {length} characters, minimum {min}")]
    TooShort { length: usize, min: usize },

    /// Outgoing value is longer than the field maximum.
    #[error("field too long: {length} characters, maximum {max}")]
    TooLong { length: usize, max: usize },

    /// Value variant does not match the converter.
    #[error("expected a {expected} value, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Converter is incoming-only.
    #[error("field has no outgoing encoding")]
    NotEncodable,
}

/// A record does not have the shape its schema requires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeViolation {
    /// Required key absent from the decoded fields.
    #[error("missing required field '{key}'")]
    Missing { key: &'static str },

    /// Key present with the wrong value variant.
    #[error("field '{key}' expected {expected}, found {found}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// Record-level constraint failed.
    #[error("field '{key}': {message}")]
    Invalid { key: &'static str, message: String },
}

impl ShapeViolation {
    /// Create an Invalid violation.
    pub fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            message: message.into(),
        }
    }

    /// Key of the offending field.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Missing { key } | Self::WrongType { key, .. } | Self::Invalid { key, .. } => key,
        }
    }
}

/// Proximate cause of a row that failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeCause {
    /// A field converter failed.
    #[error("field '{key}' at position {position}: {source}")]
    Field {
        position: usize,
        key: &'static str,
        #[source]
        source: FieldError,
    },

    /// The converted fields do not form a valid record.
    #[error(transparent)]
    Shape(#[from] ShapeViolation),
}

impl ShapeCause {
    /// Key of the field the failure is attributed to.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Field { key, .. } => key,
            Self::Shape(violation) => violation.key(),
        }
    }
}

/// A decoded row failed its shape validator.
///
/// Keeps the raw columns and everything decoded before the failure so the row
/// can be diagnosed without re-parsing the file.
#[derive(Debug, Clone, Error)]
#[error("{record_type} row at line {line}: {cause}", line = .raw.line())]
pub struct RowShapeError {
    pub record_type: RecordType,
    pub raw: RawRow,
    pub partial: FieldMap,
    #[source]
    pub cause: ShapeCause,
}

/// Errors raised by the row codec.
#[derive(Debug, Error)]
pub enum RowError {
    /// Incoming row could not be turned into a record.
    #[error(transparent)]
    Shape(Box<RowShapeError>),

    /// Outgoing field could not be encoded.
    #[error("cannot encode field '{key}' at position {position}: {source}")]
    FieldEncoding {
        position: usize,
        key: &'static str,
        #[source]
        source: FieldError,
    },

    /// Outgoing record failed validation before encoding.
    #[error("record failed validation: {0}")]
    InvalidRecord(#[source] ShapeViolation),
}

impl From<RowShapeError> for RowError {
    fn from(error: RowShapeError) -> Self {
        Self::Shape(Box::new(error))
    }
}

/// Errors raised while parsing or serializing a whole file.
#[derive(Debug, Error)]
pub enum CodecError {
    /// No non-blank line at all.
    #[error("{dialect} file is missing its header row")]
    MissingHeader { dialect: &'static str },

    /// Only one non-blank line.
    #[error("{dialect} file is missing its footer row")]
    MissingFooter { dialect: &'static str },

    /// A row failed to decode or encode.
    #[error("{dialect} {kind} ({record_type}) at line {line}: {source}")]
    Row {
        dialect: &'static str,
        kind: RowKind,
        record_type: RecordType,
        line: usize,
        #[source]
        source: RowError,
    },
}

impl CodecError {
    /// Raw columns of the offending row, when the error came from decoding.
    pub fn raw_row(&self) -> Option<&RawRow> {
        match self {
            Self::Row {
                source: RowError::Shape(shape),
                ..
            } => Some(&shape.raw),
            _ => None,
        }
    }

    /// Whether the file could not even be split into header and footer.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::MissingHeader { .. } | Self::MissingFooter { .. })
    }
}
