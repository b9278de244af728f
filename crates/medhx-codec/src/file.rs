//! File codec: header / detail / footer splitting and assembly.

use std::fmt::Display;

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::charset;
use crate::error::{CodecError, RowError, RowShapeError, ShapeCause};
use crate::row::{RawRow, decode_record, encode_row};
use crate::schema::{DecodeRecord, EncodeRecord, RowSchema};
use crate::value::FieldMap;

/// What to do when a detail row fails to decode.
///
/// Header and footer failures are always fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnRowError {
    /// Abort the parse on the first bad detail row.
    #[default]
    Fail,
    /// Log the row, keep it in [`ParsedFile::rejected`] and carry on.
    CaptureAndContinue,
}

/// Row schemas of one dialect.
#[derive(Debug)]
pub struct FileSchema<H, D, F> {
    dialect: &'static str,
    header: RowSchema<H>,
    detail: RowSchema<D>,
    footer: RowSchema<F>,
}

impl<H, D, F> FileSchema<H, D, F> {
    pub fn new(
        dialect: &'static str,
        header: RowSchema<H>,
        detail: RowSchema<D>,
        footer: RowSchema<F>,
    ) -> Self {
        Self {
            dialect,
            header,
            detail,
            footer,
        }
    }

    pub fn dialect(&self) -> &'static str {
        self.dialect
    }

    pub fn header(&self) -> &RowSchema<H> {
        &self.header
    }

    pub fn detail(&self) -> &RowSchema<D> {
        &self.detail
    }

    pub fn footer(&self) -> &RowSchema<F> {
        &self.footer
    }
}

/// A decoded record together with the raw row it came from.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedRow<T> {
    pub data: T,
    pub source: RawRow,
}

/// A detail row that failed to decode under [`OnRowError::CaptureAndContinue`].
#[derive(Debug, Clone, Serialize)]
pub struct RejectedRow {
    pub source: RawRow,
    /// Fields decoded before the failure.
    pub partial: FieldMap,
    #[serde(serialize_with = "serialize_display")]
    pub cause: ShapeCause,
}

impl RejectedRow {
    pub fn line(&self) -> usize {
        self.source.line()
    }
}

impl From<RowShapeError> for RejectedRow {
    fn from(error: RowShapeError) -> Self {
        Self {
            source: error.raw,
            partial: error.partial,
            cause: error.cause,
        }
    }
}

/// A whole parsed file.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedFile<H, D, F> {
    pub header: DecodedRow<H>,
    /// Valid detail rows in file order.
    pub details: Vec<DecodedRow<D>>,
    pub footer: DecodedRow<F>,
    /// Detail rows captured in lenient mode; always empty in strict mode.
    pub rejected: Vec<RejectedRow>,
}

impl<H, D, F> ParsedFile<H, D, F> {
    /// Number of detail lines between header and footer, valid or not.
    pub fn detail_line_count(&self) -> usize {
        self.details.len() + self.rejected.len()
    }

    /// Whether every detail row decoded.
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Typed detail records without their raw rows.
    pub fn detail_records(&self) -> impl Iterator<Item = &D> {
        self.details.iter().map(|row| &row.data)
    }
}

/// Parses and serializes files of one dialect.
#[derive(Debug)]
pub struct FileCodec<'a, H, D, F> {
    schema: &'a FileSchema<H, D, F>,
}

impl<'a, H, D, F> FileCodec<'a, H, D, F> {
    pub fn new(schema: &'a FileSchema<H, D, F>) -> Self {
        Self { schema }
    }

    fn row_error<T>(&self, schema: &RowSchema<T>, line: usize, source: RowError) -> CodecError {
        CodecError::Row {
            dialect: self.schema.dialect,
            kind: schema.kind(),
            record_type: schema.record_type(),
            line,
            source,
        }
    }

    fn decode<T: DecodeRecord>(
        &self,
        schema: &RowSchema<T>,
        raw: RawRow,
    ) -> Result<DecodedRow<T>, CodecError> {
        match decode_record(&raw, schema) {
            Ok(data) => Ok(DecodedRow { data, source: raw }),
            Err(error) => Err(self.row_error(schema, raw.line(), error.into())),
        }
    }
}

impl<H: DecodeRecord, D: DecodeRecord, F: DecodeRecord> FileCodec<'_, H, D, F> {
    /// Parse a whole file.
    ///
    /// Blank lines are ignored. The first remaining line is the header, the last
    /// is the footer, and every line in between is a detail row, kept in file
    /// order.
    pub fn parse(&self, bytes: &[u8], policy: OnRowError) -> Result<ParsedFile<H, D, F>, CodecError> {
        let dialect = self.schema.dialect;
        let text = charset::decode(bytes);
        let mut rows = split_rows(&text).into_iter();

        let header = rows.next().ok_or(CodecError::MissingHeader { dialect })?;
        let footer = rows.next_back().ok_or(CodecError::MissingFooter { dialect })?;

        let header = self.decode(&self.schema.header, header)?;

        let mut details = Vec::with_capacity(rows.len());
        let mut rejected = Vec::new();
        for raw in rows {
            match decode_record(&raw, &self.schema.detail) {
                Ok(data) => details.push(DecodedRow { data, source: raw }),
                Err(error) => match policy {
                    OnRowError::Fail => {
                        return Err(self.row_error(&self.schema.detail, raw.line(), error.into()));
                    }
                    OnRowError::CaptureAndContinue => {
                        warn!(
                            dialect,
                            line = raw.line(),
                            field = error.cause.key(),
                            "Rejected detail row"
                        );
                        rejected.push(RejectedRow::from(error));
                    }
                },
            }
        }

        let footer = self.decode(&self.schema.footer, footer)?;

        debug!(
            dialect,
            details = details.len(),
            rejected = rejected.len(),
            "Parsed flat file"
        );

        Ok(ParsedFile {
            header,
            details,
            footer,
            rejected,
        })
    }
}

impl<H: EncodeRecord, D: EncodeRecord, F: EncodeRecord> FileCodec<'_, H, D, F> {
    /// Serialize header, details and footer, each line terminated by `\n`.
    pub fn serialize(&self, header: &H, details: &[D], footer: &F) -> Result<Vec<u8>, CodecError> {
        let mut lines = Vec::with_capacity(details.len() + 2);

        lines.push(
            encode_row(header, &self.schema.header)
                .map_err(|error| self.row_error(&self.schema.header, 1, error))?,
        );
        for (index, detail) in details.iter().enumerate() {
            lines.push(
                encode_row(detail, &self.schema.detail)
                    .map_err(|error| self.row_error(&self.schema.detail, index + 2, error))?,
            );
        }
        lines.push(
            encode_row(footer, &self.schema.footer)
                .map_err(|error| self.row_error(&self.schema.footer, details.len() + 2, error))?,
        );

        debug!(
            dialect = self.schema.dialect,
            details = details.len(),
            "Serialized flat file"
        );

        for line in unrepresentable_lines(&lines) {
            warn!(
                dialect = self.schema.dialect,
                line, "Characters outside Latin-1 will be written as '?'"
            );
        }

        let mut text = lines.join("\n");
        text.push('\n');
        Ok(charset::encode(&text))
    }
}

/// One-based numbers of the lines that [`charset::encode`] would alter.
fn unrepresentable_lines(lines: &[String]) -> Vec<usize> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !charset::is_representable(line))
        .map(|(index, _)| index + 1)
        .collect()
}

/// Split decoded text into rows, skipping blank lines.
fn split_rows(text: &str) -> Vec<RawRow> {
    text.split('\n')
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            (!line.trim().is_empty()).then(|| RawRow::parse(index + 1, line))
        })
        .collect()
}

fn serialize_display<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_rows_line_numbers() {
        let rows = split_rows("HDR|a\r\n\n   \nDTL|b\nTRL|1\n");
        let lines: Vec<_> = rows.iter().map(RawRow::line).collect();
        assert_eq!(lines, vec![1, 4, 5]);
        assert_eq!(rows[0].columns(), ["HDR", "a"]);
    }

    #[test]
    fn test_split_rows_keeps_trailing_empty_columns() {
        let rows = split_rows("DTL|x||\n");
        assert_eq!(rows[0].len(), 4);
    }

    #[test]
    fn test_unrepresentable_lines() {
        let lines = vec![
            "HDR|Müller".to_string(),
            "DTL|Łódź".to_string(),
            "TRL|1 €".to_string(),
        ];
        assert_eq!(unrepresentable_lines(&lines), vec![2, 3]);
    }

    #[test]
    fn test_default_policy_is_strict() {
        assert_eq!(OnRowError::default(), OnRowError::Fail);
    }
}
