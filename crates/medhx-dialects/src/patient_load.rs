//! Patient load (`PMA`) files: the outgoing list of patients to enroll.
//!
//! | Row | Tag | Fields |
//! |-----|-----|--------|
//! | header | `HDR` | sender and receiver, population, transmission id, date and time, schedule |
//! | detail | `PNM` | one patient: name, address, birth date, gender, ordering NPI |
//! | footer | `TRL` | number of detail rows |

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use medhx_codec::{
    CodecError, DecodeRecord, EncodeRecord, FieldMap, FieldSpec, FileCodec, FileSchema,
    OnRowError, ParsedFile, RecordType, RowKind, RowSchema, ShapeViolation,
};
use serde::Serialize;
use uuid::Uuid;

use crate::VERSION;
use crate::codes::{FileAction, FileSchedule, Gender, Usage};

pub const DIALECT: &str = "patient load";

/// Transmission file type of a patient load.
pub const FILE_TYPE: &str = "PMA";

/// Longest name or address component the clearinghouse stores.
const NAME_MAX: usize = 35;
const ADDRESS_MAX: usize = 55;
const CITY_MAX: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientLoadHeader {
    pub sender_id: String,
    #[serde(skip_serializing)]
    pub sender_password: String,
    pub receiver_id: String,
    /// Transmission id followed by the facility or patient the population belongs to.
    pub population_id: String,
    pub look_back_months: u32,
    pub transmission_id: String,
    pub transmission_date: NaiveDate,
    pub transmission_time: NaiveTime,
    pub action: FileAction,
    pub schedule: FileSchedule,
    pub extract_date: NaiveDate,
    pub usage: Usage,
}

impl DecodeRecord for PatientLoadHeader {
    fn from_fields(fields: &FieldMap) -> Result<Self, ShapeViolation> {
        Ok(Self {
            sender_id: fields.non_empty_text("sender_id")?,
            sender_password: fields.text("sender_password")?,
            receiver_id: fields.non_empty_text("receiver_id")?,
            population_id: fields.non_empty_text("population_id")?,
            look_back_months: fields.count("look_back_months")?,
            transmission_id: fields.non_empty_text("transmission_id")?,
            transmission_date: fields.date("transmission_date")?,
            transmission_time: fields.time("transmission_time")?,
            action: fields.code("action")?,
            schedule: fields.code("schedule")?,
            extract_date: fields.date("extract_date")?,
            usage: fields.code("usage")?,
        })
    }
}

impl EncodeRecord for PatientLoadHeader {
    fn validate(&self) -> Result<(), ShapeViolation> {
        if self.look_back_months == 0 {
            return Err(ShapeViolation::invalid("look_back_months", "must be positive"));
        }
        Ok(())
    }

    fn to_fields(&self) -> FieldMap {
        FieldMap::new()
            .with("version", VERSION)
            .with("sender_id", self.sender_id.as_str())
            .with("sender_password", self.sender_password.as_str())
            .with("receiver_id", self.receiver_id.as_str())
            .with("population_id", self.population_id.as_str())
            .with("look_back_months", self.look_back_months)
            .with("transmission_id", self.transmission_id.as_str())
            .with("transmission_date", self.transmission_date)
            .with("transmission_time", self.transmission_time)
            .with("file_type", FILE_TYPE)
            .with_code("action", Some(self.action))
            .with_code("schedule", Some(self.schedule))
            .with("extract_date", self.extract_date)
            .with_code("usage", Some(self.usage))
    }
}

/// One patient to enroll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientLoadDetail {
    /// 1-based position of the patient in the request.
    pub sequence: u32,
    /// OID of the organization that issued `patient_id`.
    pub assigning_authority: String,
    pub patient_id: Uuid,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    /// Five or nine digits, no dash.
    pub zip: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    /// NPI of the facility requesting the history.
    pub npi: String,
    pub end_monitoring_date: Option<NaiveDate>,
}

impl DecodeRecord for PatientLoadDetail {
    fn from_fields(fields: &FieldMap) -> Result<Self, ShapeViolation> {
        let detail = Self {
            sequence: fields.count("sequence")?,
            assigning_authority: fields.non_empty_text("assigning_authority")?,
            patient_id: fields.uuid("patient_id")?,
            last_name: fields.text("last_name")?,
            first_name: fields.text("first_name")?,
            middle_name: fields.opt_text("middle_name")?,
            prefix: fields.opt_text("prefix")?,
            suffix: fields.opt_text("suffix")?,
            address_line1: fields.text("address_line1")?,
            address_line2: fields.opt_text("address_line2")?,
            city: fields.text("city")?,
            state: fields.text("state")?,
            zip: fields.text("zip")?,
            date_of_birth: fields.date("date_of_birth")?,
            gender: fields.code("gender")?,
            npi: fields.text("npi")?,
            end_monitoring_date: fields.opt_date("end_monitoring_date")?,
        };
        detail.validate()?;
        Ok(detail)
    }
}

impl EncodeRecord for PatientLoadDetail {
    fn validate(&self) -> Result<(), ShapeViolation> {
        if self.sequence == 0 {
            return Err(ShapeViolation::invalid("sequence", "must be positive"));
        }
        for (key, value) in [
            ("last_name", &self.last_name),
            ("first_name", &self.first_name),
            ("address_line1", &self.address_line1),
            ("city", &self.city),
        ] {
            if value.trim().is_empty() {
                return Err(ShapeViolation::invalid(key, "must not be empty"));
            }
        }
        if self.state.len() != 2 || !self.state.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(ShapeViolation::invalid(
                "state",
                "must be a two-letter state code",
            ));
        }
        if !matches!(self.zip.len(), 5 | 9) || !is_digits(&self.zip) {
            return Err(ShapeViolation::invalid("zip", "must be 5 or 9 digits"));
        }
        if self.npi.len() != 10 || !is_digits(&self.npi) {
            return Err(ShapeViolation::invalid("npi", "must be 10 digits"));
        }
        Ok(())
    }

    fn to_fields(&self) -> FieldMap {
        FieldMap::new()
            .with("sequence", self.sequence)
            .with("assigning_authority", self.assigning_authority.as_str())
            .with("patient_id", self.patient_id)
            .with("last_name", self.last_name.as_str())
            .with("first_name", self.first_name.as_str())
            .with_opt("middle_name", self.middle_name.as_deref())
            .with_opt("prefix", self.prefix.as_deref())
            .with_opt("suffix", self.suffix.as_deref())
            .with("address_line1", self.address_line1.as_str())
            .with_opt("address_line2", self.address_line2.as_deref())
            .with("city", self.city.as_str())
            .with("state", self.state.as_str())
            .with("zip", self.zip.as_str())
            .with("date_of_birth", self.date_of_birth)
            .with_code("gender", Some(self.gender))
            .with("npi", self.npi.as_str())
            .with_opt("end_monitoring_date", self.end_monitoring_date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PatientLoadFooter {
    pub total_records: u32,
}

impl DecodeRecord for PatientLoadFooter {
    fn from_fields(fields: &FieldMap) -> Result<Self, ShapeViolation> {
        Ok(Self {
            total_records: fields.count("total_records")?,
        })
    }
}

impl EncodeRecord for PatientLoadFooter {
    fn to_fields(&self) -> FieldMap {
        FieldMap::new().with("total_records", self.total_records)
    }
}

pub type PatientLoadSchema = FileSchema<PatientLoadHeader, PatientLoadDetail, PatientLoadFooter>;
pub type ParsedPatientLoad = ParsedFile<PatientLoadHeader, PatientLoadDetail, PatientLoadFooter>;

static SCHEMA: LazyLock<PatientLoadSchema> = LazyLock::new(|| {
    FileSchema::new(
        DIALECT,
        RowSchema::new(
            RowKind::Header,
            RecordType::Header,
            vec![
                FieldSpec::code(1, "version", &[VERSION]),
                FieldSpec::text(2, "sender_id").max_length(30),
                FieldSpec::text(3, "sender_password").max_length(10),
                FieldSpec::text(4, "receiver_id").max_length(30),
                FieldSpec::text(5, "population_id").max_length(64),
                FieldSpec::integer(6, "look_back_months"),
                FieldSpec::text(7, "transmission_id").min_length(1).max_length(10),
                FieldSpec::date(8, "transmission_date"),
                FieldSpec::time(9, "transmission_time", true),
                FieldSpec::code(10, "file_type", &[FILE_TYPE]),
                FieldSpec::code_set::<FileAction>(11, "action"),
                FieldSpec::code_set::<FileSchedule>(12, "schedule"),
                FieldSpec::date(13, "extract_date"),
                FieldSpec::code_set::<Usage>(14, "usage"),
            ],
        ),
        RowSchema::new(
            RowKind::Detail,
            RecordType::Patient,
            vec![
                FieldSpec::integer(1, "sequence"),
                FieldSpec::text(2, "assigning_authority").max_length(64),
                FieldSpec::uuid(3, "patient_id"),
                FieldSpec::text(4, "last_name").min_length(1).max_length(NAME_MAX),
                FieldSpec::text(5, "first_name").min_length(1).max_length(NAME_MAX),
                FieldSpec::optional_text(6, "middle_name")
                    .max_length(NAME_MAX)
                    .truncating(),
                FieldSpec::optional_text(7, "prefix").max_length(10).truncating(),
                FieldSpec::optional_text(8, "suffix").max_length(10).truncating(),
                FieldSpec::text(9, "address_line1").max_length(ADDRESS_MAX),
                FieldSpec::optional_text(10, "address_line2")
                    .max_length(ADDRESS_MAX)
                    .truncating(),
                FieldSpec::text(11, "city").max_length(CITY_MAX),
                FieldSpec::text(12, "state").min_length(2).max_length(2),
                FieldSpec::text(13, "zip").min_length(5).max_length(9),
                FieldSpec::date(14, "date_of_birth"),
                FieldSpec::code_set::<Gender>(15, "gender"),
                FieldSpec::text(16, "npi").min_length(10).max_length(10),
                FieldSpec::optional_date(17, "end_monitoring_date"),
            ],
        ),
        RowSchema::new(
            RowKind::Footer,
            RecordType::Trailer,
            vec![FieldSpec::integer(1, "total_records")],
        ),
    )
});

pub fn schema() -> &'static PatientLoadSchema {
    &SCHEMA
}

/// Parse a patient load file, e.g. one previously produced by [`serialize`].
pub fn parse(bytes: &[u8], policy: OnRowError) -> Result<ParsedPatientLoad, CodecError> {
    FileCodec::new(schema()).parse(bytes, policy)
}

pub fn serialize(
    header: &PatientLoadHeader,
    details: &[PatientLoadDetail],
    footer: &PatientLoadFooter,
) -> Result<Vec<u8>, CodecError> {
    FileCodec::new(schema()).serialize(header, details, footer)
}

fn is_digits(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use medhx_codec::{RowError, encode_row};

    use super::*;

    fn header() -> PatientLoadHeader {
        PatientLoadHeader {
            sender_id: "ACME".to_string(),
            sender_password: "secret".to_string(),
            receiver_id: "S00000000000001".to_string(),
            population_id: "lmq3k0a1x2fac1".to_string(),
            look_back_months: 12,
            transmission_id: "lmq3k0a1x2".to_string(),
            transmission_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            transmission_time: NaiveTime::from_hms_milli_opt(3, 4, 5, 60).unwrap(),
            action: FileAction::Update,
            schedule: FileSchedule::AdHoc,
            extract_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            usage: Usage::Test,
        }
    }

    fn detail() -> PatientLoadDetail {
        PatientLoadDetail {
            sequence: 1,
            assigning_authority: "2.16.840.1.113883.3.9621".to_string(),
            patient_id: Uuid::parse_str("0195f4a4-1e3c-7b8e-9c1a-2b3c4d5e6f70").unwrap(),
            last_name: "Lovelace".to_string(),
            first_name: "Ada".to_string(),
            middle_name: Some("Augusta".to_string()),
            prefix: None,
            suffix: None,
            address_line1: "12 St James's Square".to_string(),
            address_line2: None,
            city: "London".to_string(),
            state: "NY".to_string(),
            zip: "10001".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1815, 12, 10).unwrap(),
            gender: Gender::Female,
            npi: "1234567893".to_string(),
            end_monitoring_date: None,
        }
    }

    #[test]
    fn test_header_row() {
        let row = encode_row(&header(), schema().header()).unwrap();
        assert_eq!(
            row,
            "HDR|3.0|ACME|secret|S00000000000001|lmq3k0a1x2fac1|12|lmq3k0a1x2|20250102|03040506|PMA|U|ADHOC|20250102|T"
        );
    }

    #[test]
    fn test_detail_row_has_eighteen_columns() {
        let row = encode_row(&detail(), schema().detail()).unwrap();
        assert_eq!(row.split('|').count(), 18);
        assert!(row.starts_with(
            "PNM|1|2.16.840.1.113883.3.9621|0195f4a41e3c7b8e9c1a2b3c4d5e6f70|Lovelace|Ada|Augusta|||"
        ));
        assert!(row.ends_with("|18151210|F|1234567893|"));
    }

    #[test]
    fn test_detail_validation() {
        let cases: [(&str, fn(&mut PatientLoadDetail)); 5] = [
            ("sequence", |d: &mut PatientLoadDetail| d.sequence = 0),
            ("first_name", |d: &mut PatientLoadDetail| d.first_name = " ".to_string()),
            ("state", |d: &mut PatientLoadDetail| d.state = "New York".to_string()),
            ("zip", |d: &mut PatientLoadDetail| d.zip = "1000".to_string()),
            ("npi", |d: &mut PatientLoadDetail| d.npi = "12345".to_string()),
        ];
        for (key, mutate) in cases {
            let mut row = detail();
            mutate(&mut row);
            let err = encode_row(&row, schema().detail()).unwrap_err();
            assert!(
                matches!(&err, RowError::InvalidRecord(violation) if violation.key() == key),
                "{key}: {err}"
            );
        }
    }

    #[test]
    fn test_serialize_then_parse() {
        let details = vec![detail()];
        let footer = PatientLoadFooter { total_records: 1 };
        let bytes = serialize(&header(), &details, &footer).unwrap();
        let parsed = parse(&bytes, OnRowError::Fail).unwrap();
        assert_eq!(parsed.header.data, header());
        assert_eq!(parsed.details[0].data, details[0]);
        assert_eq!(parsed.footer.data.total_records, 1);
    }

    #[test]
    fn test_password_is_not_serialized() {
        let json = serde_json::to_string(&header()).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"usage\":\"T\""));
    }
}
