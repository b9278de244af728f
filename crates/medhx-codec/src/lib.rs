//! Schema-driven codec for pipe-delimited medication-history flat files.
//!
//! Clearinghouse transactions are single-byte text files made of exactly one
//! header row, any number of detail rows and exactly one footer row. Every row is
//! a list of `|`-separated columns whose meaning is fixed by position. This crate
//! provides the engine that every file dialect is built on:
//!
//! - [`convert`]: per-type field converters (text, code lists, dates, timestamps,
//!   times, integers, compressed UUIDs)
//! - [`RowSchema`] / [`FieldSpec`]: position-addressed field catalogs
//! - [`decode_row`] / [`encode_row`]: the row codec
//! - [`FileCodec`]: header / detail / footer splitting and assembly
//!
//! # Example
//!
//! ```
//! use medhx_codec::{
//!     DecodeRecord, EncodeRecord, FieldMap, FieldSpec, FileCodec, FileSchema, OnRowError,
//!     RecordType, RowKind, RowSchema, ShapeViolation,
//! };
//!
//! struct Header { sender_id: String }
//! struct Detail { name: String }
//! struct Footer { total: i64 }
//!
//! impl DecodeRecord for Header {
//!     fn from_fields(fields: &FieldMap) -> Result<Self, ShapeViolation> {
//!         Ok(Self { sender_id: fields.text("sender_id")? })
//!     }
//! }
//! impl DecodeRecord for Detail {
//!     fn from_fields(fields: &FieldMap) -> Result<Self, ShapeViolation> {
//!         Ok(Self { name: fields.text("name")? })
//!     }
//! }
//! impl DecodeRecord for Footer {
//!     fn from_fields(fields: &FieldMap) -> Result<Self, ShapeViolation> {
//!         Ok(Self { total: fields.integer("total")? })
//!     }
//! }
//!
//! let schema: FileSchema<Header, Detail, Footer> = FileSchema::new(
//!     "demo",
//!     RowSchema::new(RowKind::Header, RecordType::Header, vec![FieldSpec::text(1, "sender_id")]),
//!     RowSchema::new(RowKind::Detail, RecordType::Detail, vec![FieldSpec::text(1, "name")]),
//!     RowSchema::new(RowKind::Footer, RecordType::Trailer, vec![FieldSpec::integer(1, "total")]),
//! );
//!
//! let parsed = FileCodec::new(&schema)
//!     .parse(b"HDR|ACME\nDTL|a\\F\\b\nTRL|1\n", OnRowError::Fail)
//!     .unwrap();
//! assert_eq!(parsed.header.data.sender_id, "ACME");
//! assert_eq!(parsed.details[0].data.name, "a|b");
//! assert_eq!(parsed.footer.data.total, 1);
//! ```

pub mod charset;
pub mod convert;
mod error;
mod file;
mod record;
mod row;
mod schema;
mod value;

pub use convert::{Converter, TextFormat};
pub use error::{CodecError, FieldError, RowError, RowShapeError, ShapeCause, ShapeViolation};
pub use file::{DecodedRow, FileCodec, FileSchema, OnRowError, ParsedFile, RejectedRow};
pub use record::{CodeSet, RecordType, RowKind};
pub use row::{RawRow, decode_fields, decode_row, encode_row};
pub use schema::{DecodeRecord, EncodeRecord, FieldSpec, RowSchema};
pub use value::{FieldMap, FieldValue};

#[doc(hidden)]
pub use serde as __serde;

/// Column separator of every dialect.
pub const DELIMITER: char = '|';

/// Escape sequence standing in for a literal `|` inside a field value.
pub const ESCAPED_DELIMITER: &str = "\\F\\";

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
