//! Patient verification files: the clearinghouse's acknowledgement of a load.
//!
//! The header carries the overall [`LoadStatus`]; every detail row reports one
//! problem with one patient row of the load file. Verification files are always
//! parsed strictly: a detail that cannot be read means the acknowledgement as a
//! whole cannot be trusted.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use medhx_codec::{
    CodecError, DecodeRecord, FieldMap, FieldSpec, FileCodec, FileSchema, OnRowError, ParsedFile,
    RecordType, RowKind, RowSchema, ShapeViolation,
};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::ACCEPTED_VERSIONS;
use crate::codes::{FileAction, FileSchedule, Severity};
use crate::patient_load::FILE_TYPE;

pub use crate::codes::LoadStatus;

pub const DIALECT: &str = "patient verification";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationHeader {
    pub version: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub population_id: String,
    /// Transmission id of the acknowledged load file.
    pub transmission_id: String,
    pub transmission_date: NaiveDate,
    pub transmission_time: NaiveTime,
    pub action: FileAction,
    pub schedule: FileSchedule,
    pub load_status: LoadStatus,
    pub load_status_description: Option<String>,
    pub processed_date: Option<NaiveDate>,
}

impl DecodeRecord for VerificationHeader {
    fn from_fields(fields: &FieldMap) -> Result<Self, ShapeViolation> {
        Ok(Self {
            version: fields.text("version")?,
            sender_id: fields.text("sender_id")?,
            receiver_id: fields.text("receiver_id")?,
            population_id: fields.text("population_id")?,
            transmission_id: fields.non_empty_text("transmission_id")?,
            transmission_date: fields.date("transmission_date")?,
            transmission_time: fields.time("transmission_time")?,
            action: fields.code("action")?,
            schedule: fields.code("schedule")?,
            load_status: fields.code("load_status")?,
            load_status_description: fields.opt_text("load_status_description")?,
            processed_date: fields.opt_date("processed_date")?,
        })
    }
}

/// One problem found with one patient row of the load file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationDetail {
    pub sequence: u32,
    /// Sequence number of the `PNM` row the problem belongs to.
    pub source_sequence: u32,
    /// Absent when the patient row was too broken to read an id from.
    pub patient_id: Option<Uuid>,
    pub severity: Severity,
    pub error_code: String,
    pub error_description: String,
    pub field_name: Option<String>,
}

impl DecodeRecord for VerificationDetail {
    fn from_fields(fields: &FieldMap) -> Result<Self, ShapeViolation> {
        Ok(Self {
            sequence: fields.count("sequence")?,
            source_sequence: fields.count("source_sequence")?,
            patient_id: fields.opt_uuid("patient_id")?,
            severity: fields.code("severity")?,
            error_code: fields.non_empty_text("error_code")?,
            error_description: fields.text("error_description")?,
            field_name: fields.opt_text("field_name")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerificationFooter {
    /// Patient rows the clearinghouse read.
    pub processed_count: u32,
    /// Patient rows with at least one problem.
    pub error_record_count: u32,
    pub loaded_count: u32,
    /// Problems reported, i.e. detail rows.
    pub total_error_count: u32,
}

impl DecodeRecord for VerificationFooter {
    fn from_fields(fields: &FieldMap) -> Result<Self, ShapeViolation> {
        let footer = Self {
            processed_count: fields.count("processed_count")?,
            error_record_count: fields.count("error_record_count")?,
            loaded_count: fields.count("loaded_count")?,
            total_error_count: fields.count("total_error_count")?,
        };
        if footer.loaded_count > footer.processed_count {
            return Err(ShapeViolation::invalid(
                "loaded_count",
                "exceeds the processed count",
            ));
        }
        Ok(footer)
    }
}

pub type VerificationSchema = FileSchema<VerificationHeader, VerificationDetail, VerificationFooter>;
pub type ParsedVerification = ParsedFile<VerificationHeader, VerificationDetail, VerificationFooter>;

static SCHEMA: LazyLock<VerificationSchema> = LazyLock::new(|| {
    FileSchema::new(
        DIALECT,
        RowSchema::new(
            RowKind::Header,
            RecordType::Header,
            vec![
                FieldSpec::code(1, "version", ACCEPTED_VERSIONS),
                FieldSpec::text(2, "sender_id"),
                FieldSpec::text(3, "receiver_id"),
                FieldSpec::text(4, "population_id"),
                FieldSpec::text(5, "transmission_id"),
                FieldSpec::date(6, "transmission_date"),
                FieldSpec::time(7, "transmission_time", true),
                FieldSpec::code(8, "file_type", &[FILE_TYPE]),
                FieldSpec::code_set::<FileAction>(9, "action"),
                FieldSpec::code_set::<FileSchedule>(10, "schedule"),
                FieldSpec::code_set::<LoadStatus>(11, "load_status"),
                FieldSpec::optional_text(12, "load_status_description"),
                FieldSpec::optional_date(13, "processed_date"),
            ],
        ),
        RowSchema::new(
            RowKind::Detail,
            RecordType::Detail,
            vec![
                FieldSpec::integer(1, "sequence"),
                FieldSpec::integer(2, "source_sequence"),
                FieldSpec::optional_uuid(3, "patient_id"),
                FieldSpec::code_set::<Severity>(4, "severity"),
                FieldSpec::text(5, "error_code"),
                FieldSpec::text(6, "error_description"),
                FieldSpec::optional_text(7, "field_name"),
            ],
        ),
        RowSchema::new(
            RowKind::Footer,
            RecordType::Trailer,
            vec![
                FieldSpec::integer(1, "processed_count"),
                FieldSpec::integer(2, "error_record_count"),
                FieldSpec::integer(3, "loaded_count"),
                FieldSpec::integer(4, "total_error_count"),
            ],
        ),
    )
});

pub fn schema() -> &'static VerificationSchema {
    &SCHEMA
}

/// Parse a verification file; the first unreadable row aborts the parse.
pub fn parse(bytes: &[u8]) -> Result<ParsedVerification, CodecError> {
    let parsed = FileCodec::new(schema()).parse(bytes, OnRowError::Fail)?;
    debug!(
        transmission_id = %parsed.header.data.transmission_id,
        load_status = ?parsed.header.data.load_status,
        details = parsed.details.len(),
        "Read verification file"
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "HDR|3.0|ACME|S00000000000001|lmq3k0a1x2fac1|lmq3k0a1x2|20250102|03040506|PMA|U|ADHOC|02|File loaded with errors.|20250103";

    #[test]
    fn test_header_fields() {
        let file = format!("{HEADER}\nTRL|2|0|2|0\n");
        let parsed = parse(file.as_bytes()).unwrap();
        let header = &parsed.header.data;
        assert_eq!(header.transmission_id, "lmq3k0a1x2");
        assert_eq!(header.load_status, LoadStatus::LoadedWithErrors);
        assert_eq!(
            header.processed_date,
            NaiveDate::from_ymd_opt(2025, 1, 3)
        );
        assert_eq!(parsed.footer.data.loaded_count, 2);
    }

    #[test]
    fn test_unknown_severity_is_fatal() {
        let file = format!("{HEADER}\nDTL|1|1||X|E100|Bad|\nTRL|1|1|0|1\n");
        let err = parse(file.as_bytes()).unwrap_err();
        let CodecError::Row { kind, line, .. } = err else {
            panic!("expected a row error");
        };
        assert_eq!(kind, RowKind::Detail);
        assert_eq!(line, 2);
    }

    #[test]
    fn test_footer_counts_are_consistent() {
        let file = format!("{HEADER}\nTRL|1|0|2|0\n");
        assert!(parse(file.as_bytes()).is_err());
    }
}
