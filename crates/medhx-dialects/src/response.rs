//! Flat-file medication history responses.
//!
//! One detail row per dispensed or prescribed medication found for an enrolled
//! patient. The detail row spans 86 positions; positions 23, 24, 35, 40 and 65
//! are retired and kept only as reserved columns. The clearinghouse may append
//! positions in later versions, which decoding ignores.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use medhx_codec::{
    CodecError, DecodeRecord, FieldMap, FieldSpec, FileCodec, FileSchema, OnRowError, ParsedFile,
    RecordType, RowKind, RowSchema, ShapeViolation,
};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::VERSION;
use crate::codes::{Consent, DeaSchedule, Gender, PaymentCode, PlanCode, SexAtBirth};

pub const DIALECT: &str = "flat-file response";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatFileHeader {
    pub version: String,
    pub receiver_id: String,
    pub sender_id: String,
    pub population_id: String,
    pub transmission_id: String,
    pub sent_time: DateTime<Utc>,
}

impl DecodeRecord for FlatFileHeader {
    fn from_fields(fields: &FieldMap) -> Result<Self, ShapeViolation> {
        Ok(Self {
            version: fields.text("version")?,
            receiver_id: fields.text("receiver_id")?,
            sender_id: fields.text("sender_id")?,
            population_id: fields.text("population_id")?,
            transmission_id: fields.text("transmission_id")?,
            sent_time: fields.timestamp("sent_time")?,
        })
    }
}

/// The enrolled patient a medication was found for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponsePatient {
    pub id: Uuid,
    pub last_name: String,
    pub first_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub zip: String,
    pub primary_phone: Option<String>,
    pub sex_at_birth: Option<SexAtBirth>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Medication {
    pub description: Option<String>,
    pub product_code: Option<String>,
    pub product_code_qualifier: Option<String>,
    pub strength_value: Option<String>,
    pub drug_database_code: Option<String>,
    pub drug_database_code_qualifier: Option<String>,
    pub strength_form_code: Option<String>,
    pub strength_unit_of_measure: Option<String>,
    pub dea_schedule: Option<DeaSchedule>,
    pub quantity_dispensed: Option<String>,
    pub code_list_qualifier: Option<String>,
    pub unit_source_code: Option<String>,
    pub quantity_unit_of_measure: Option<String>,
    pub days_supply: Option<String>,
    pub directions: Option<String>,
    pub refills_remaining: Option<String>,
    pub substitutions: Option<String>,
    pub date_written: Option<NaiveDate>,
    pub last_filled_date: Option<NaiveDate>,
    pub sold_date: Option<NaiveDate>,
    pub prior_authorization_number: Option<String>,
    pub ndc_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pharmacy {
    pub ncpdp_id: Option<String>,
    pub npi: Option<String>,
    pub name: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Prescriber {
    pub npi: Option<String>,
    pub dea_number: Option<String>,
    pub state_license_number: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub first_name: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
}

/// Where the history record came from and how the fill was identified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FillSource {
    pub history_source_qualifier: Option<String>,
    pub fill_number: Option<u32>,
    pub prescription_number: Option<String>,
    pub source_description: Option<String>,
    pub reference_id_value: Option<String>,
    pub reference_id_qualifier: Option<String>,
    pub rx_reference_number: Option<String>,
    pub electronic_prescription_order: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub plan_code: Option<PlanCode>,
    pub payment_code: Option<PaymentCode>,
    pub plan_network_bin: Option<i64>,
    pub plan_network_pcn: Option<String>,
    pub plan_network_group_id: Option<String>,
    pub insurance_id_number: Option<String>,
}

/// One medication history record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatFileDetail {
    pub sequence: u32,
    pub message_id: String,
    pub sent_time: DateTime<Utc>,
    pub status: String,
    pub note: String,
    /// NPI of the provider the history was requested for.
    pub requester_npi: String,
    pub requester_name: String,
    pub patient: ResponsePatient,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub consent: Consent,
    pub medication: Medication,
    pub pharmacy: Pharmacy,
    pub prescriber: Prescriber,
    pub fill: FillSource,
    pub coverage: Coverage,
    pub diagnosis_details: Option<String>,
}

impl DecodeRecord for FlatFileDetail {
    fn from_fields(fields: &FieldMap) -> Result<Self, ShapeViolation> {
        let patient = ResponsePatient {
            id: fields.uuid("patient_id")?,
            last_name: fields.text("patient_last_name")?,
            first_name: fields.text("patient_first_name")?,
            date_of_birth: fields.date("patient_date_of_birth")?,
            gender: fields.code("patient_gender")?,
            zip: fields.text("patient_zip")?,
            primary_phone: fields.opt_text("patient_primary_phone")?,
            sex_at_birth: fields.opt_code("sex_at_birth")?,
        };
        let medication = Medication {
            description: fields.opt_text("drug_description")?,
            product_code: fields.opt_text("product_code")?,
            product_code_qualifier: fields.opt_text("product_code_qualifier")?,
            strength_value: fields.opt_text("strength_value")?,
            drug_database_code: fields.opt_text("drug_database_code")?,
            drug_database_code_qualifier: fields.opt_text("drug_database_code_qualifier")?,
            strength_form_code: fields.opt_text("strength_form_code")?,
            strength_unit_of_measure: fields.opt_text("strength_unit_of_measure")?,
            dea_schedule: fields.opt_code("dea_schedule")?,
            quantity_dispensed: fields.opt_text("quantity_dispensed")?,
            code_list_qualifier: fields.opt_text("code_list_qualifier")?,
            unit_source_code: fields.opt_text("unit_source_code")?,
            quantity_unit_of_measure: fields.opt_text("quantity_unit_of_measure")?,
            days_supply: fields.opt_text("days_supply")?,
            directions: fields.opt_text("directions")?,
            refills_remaining: fields.opt_text("refills_remaining")?,
            substitutions: fields.opt_text("substitutions")?,
            date_written: fields.opt_date("date_written")?,
            last_filled_date: fields.opt_date("last_filled_date")?,
            sold_date: fields.opt_date("sold_date")?,
            prior_authorization_number: fields.opt_text("prior_authorization_number")?,
            ndc_number: fields.opt_text("ndc_number")?,
        };
        let pharmacy = Pharmacy {
            ncpdp_id: fields.opt_text("pharmacy_ncpdp_id")?,
            npi: fields.opt_text("pharmacy_npi")?,
            name: fields.opt_text("pharmacy_name")?,
            address_line1: fields.opt_text("pharmacy_address_line1")?,
            address_line2: fields.opt_text("pharmacy_address_line2")?,
            city: fields.opt_text("pharmacy_city")?,
            state: fields.opt_text("pharmacy_state")?,
            zip: fields.opt_text("pharmacy_zip")?,
            phone: fields.opt_text("pharmacy_phone")?,
            fax: fields.opt_text("pharmacy_fax")?,
        };
        let prescriber = Prescriber {
            npi: fields.opt_text("prescriber_npi")?,
            dea_number: fields.opt_text("prescriber_dea_number")?,
            state_license_number: fields.opt_text("prescriber_state_license_number")?,
            last_name: fields.opt_text("prescriber_last_name")?,
            middle_name: fields.opt_text("prescriber_middle_name")?,
            first_name: fields.opt_text("prescriber_first_name")?,
            prefix: fields.opt_text("prescriber_prefix")?,
            suffix: fields.opt_text("prescriber_suffix")?,
            address_line1: fields.opt_text("prescriber_address_line1")?,
            address_line2: fields.opt_text("prescriber_address_line2")?,
            city: fields.opt_text("prescriber_city")?,
            state: fields.opt_text("prescriber_state")?,
            zip: fields.opt_text("prescriber_zip")?,
            phone: fields.opt_text("prescriber_phone")?,
            fax: fields.opt_text("prescriber_fax")?,
        };
        let fill = FillSource {
            history_source_qualifier: fields.opt_text("history_source_qualifier")?,
            fill_number: fields.opt_count("fill_number")?,
            prescription_number: fields.opt_text("prescription_number")?,
            source_description: fields.opt_text("source_description")?,
            reference_id_value: fields.opt_text("reference_id_value")?,
            reference_id_qualifier: fields.opt_text("reference_id_qualifier")?,
            rx_reference_number: fields.opt_text("rx_reference_number")?,
            electronic_prescription_order: fields.opt_text("electronic_prescription_order")?,
        };
        let coverage = Coverage {
            plan_code: fields.opt_code("plan_code")?,
            payment_code: fields.opt_code("payment_code")?,
            plan_network_bin: fields.opt_integer("plan_network_bin")?,
            plan_network_pcn: fields.opt_text("plan_network_pcn")?,
            plan_network_group_id: fields.opt_text("plan_network_group_id")?,
            insurance_id_number: fields.opt_text("insurance_id_number")?,
        };

        Ok(Self {
            sequence: fields.count("sequence")?,
            message_id: fields.text("message_id")?,
            sent_time: fields.timestamp("sent_time")?,
            status: fields.text("status")?,
            note: fields.text("note")?,
            requester_npi: fields.text("requester_npi")?,
            requester_name: fields.text("requester_name")?,
            patient,
            start_date: fields.date("start_date")?,
            end_date: fields.date("end_date")?,
            consent: fields.code("consent")?,
            medication,
            pharmacy,
            prescriber,
            fill,
            coverage,
            diagnosis_details: fields.opt_text("diagnosis_details")?,
        })
    }
}

/// Processing totals; the population counters are only sent by newer versions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlatFileFooter {
    pub processed_count: u32,
    pub medication_count: Option<u32>,
    pub medication_from_pbm_count: Option<u32>,
    pub medication_from_pharmacy_count: Option<u32>,
    pub patients_found: Option<u32>,
    pub patients_with_incomplete_history: Option<u32>,
    pub patients_with_no_history: Option<u32>,
    pub patients_not_found: Option<u32>,
    pub processing_errors: Option<u32>,
    /// Patients with more than 300 medications.
    pub patients_with_large_history: Option<u32>,
}

impl DecodeRecord for FlatFileFooter {
    fn from_fields(fields: &FieldMap) -> Result<Self, ShapeViolation> {
        Ok(Self {
            processed_count: fields.count("processed_count")?,
            medication_count: fields.opt_count("medication_count")?,
            medication_from_pbm_count: fields.opt_count("medication_from_pbm_count")?,
            medication_from_pharmacy_count: fields.opt_count("medication_from_pharmacy_count")?,
            patients_found: fields.opt_count("patients_found")?,
            patients_with_incomplete_history: fields
                .opt_count("patients_with_incomplete_history")?,
            patients_with_no_history: fields.opt_count("patients_with_no_history")?,
            patients_not_found: fields.opt_count("patients_not_found")?,
            processing_errors: fields.opt_count("processing_errors")?,
            patients_with_large_history: fields.opt_count("patients_with_large_history")?,
        })
    }
}

pub type FlatFileSchema = FileSchema<FlatFileHeader, FlatFileDetail, FlatFileFooter>;
pub type ParsedFlatFile = ParsedFile<FlatFileHeader, FlatFileDetail, FlatFileFooter>;

fn detail_fields() -> Vec<FieldSpec> {
    let text = FieldSpec::optional_text;
    vec![
        FieldSpec::integer(1, "sequence"),
        FieldSpec::text(2, "message_id"),
        FieldSpec::timestamp(3, "sent_time"),
        FieldSpec::text(4, "status"),
        FieldSpec::text(5, "note"),
        FieldSpec::text(6, "requester_npi"),
        FieldSpec::text(7, "requester_name"),
        FieldSpec::uuid(8, "patient_id"),
        FieldSpec::text(9, "patient_last_name"),
        FieldSpec::text(10, "patient_first_name"),
        FieldSpec::date(11, "patient_date_of_birth"),
        FieldSpec::code_set::<Gender>(12, "patient_gender"),
        FieldSpec::text(13, "patient_zip"),
        FieldSpec::date(14, "start_date"),
        FieldSpec::date(15, "end_date"),
        FieldSpec::code_set::<Consent>(16, "consent"),
        text(17, "drug_description"),
        text(18, "product_code"),
        text(19, "product_code_qualifier"),
        text(20, "strength_value"),
        text(21, "drug_database_code"),
        text(22, "drug_database_code_qualifier"),
        FieldSpec::reserved(23, "retired"),
        FieldSpec::reserved(24, "retired"),
        text(25, "strength_form_code"),
        text(26, "strength_unit_of_measure"),
        FieldSpec::optional_code_set::<DeaSchedule>(27, "dea_schedule"),
        text(28, "quantity_dispensed"),
        text(29, "code_list_qualifier"),
        text(30, "unit_source_code"),
        text(31, "quantity_unit_of_measure"),
        text(32, "days_supply"),
        text(33, "directions"),
        text(34, "refills_remaining"),
        FieldSpec::reserved(35, "not in use"),
        text(36, "substitutions"),
        FieldSpec::optional_date(37, "date_written"),
        FieldSpec::optional_date(38, "last_filled_date"),
        FieldSpec::optional_date(39, "sold_date"),
        FieldSpec::reserved(40, "not in use"),
        text(41, "prior_authorization_number"),
        text(42, "pharmacy_ncpdp_id"),
        text(43, "pharmacy_npi"),
        text(44, "pharmacy_name"),
        text(45, "pharmacy_address_line1"),
        text(46, "pharmacy_address_line2"),
        text(47, "pharmacy_city"),
        text(48, "pharmacy_state"),
        text(49, "pharmacy_zip"),
        text(50, "pharmacy_phone"),
        text(51, "pharmacy_fax"),
        text(52, "prescriber_npi"),
        text(53, "prescriber_dea_number"),
        text(54, "prescriber_state_license_number"),
        text(55, "prescriber_last_name"),
        text(56, "prescriber_middle_name"),
        text(57, "prescriber_first_name"),
        text(58, "prescriber_prefix"),
        text(59, "prescriber_suffix"),
        text(60, "prescriber_address_line1"),
        text(61, "prescriber_address_line2"),
        text(62, "prescriber_city"),
        text(63, "prescriber_state"),
        text(64, "prescriber_zip"),
        FieldSpec::reserved(65, "retired"),
        text(66, "prescriber_phone"),
        text(67, "prescriber_fax"),
        text(68, "history_source_qualifier"),
        FieldSpec::optional_integer(69, "fill_number"),
        text(70, "prescription_number"),
        text(71, "source_description"),
        text(72, "reference_id_value"),
        text(73, "reference_id_qualifier"),
        text(74, "rx_reference_number"),
        text(75, "electronic_prescription_order"),
        text(76, "patient_primary_phone"),
        FieldSpec::optional_code_set::<PlanCode>(77, "plan_code"),
        FieldSpec::optional_code_set::<PaymentCode>(78, "payment_code"),
        FieldSpec::optional_integer(79, "plan_network_bin"),
        text(80, "plan_network_pcn"),
        text(81, "plan_network_group_id"),
        text(82, "insurance_id_number"),
        FieldSpec::optional_code_set::<SexAtBirth>(83, "sex_at_birth"),
        text(84, "diagnosis_details"),
        text(85, "ndc_number"),
    ]
}

static SCHEMA: LazyLock<FlatFileSchema> = LazyLock::new(|| {
    FileSchema::new(
        DIALECT,
        RowSchema::new(
            RowKind::Header,
            RecordType::Header,
            vec![
                FieldSpec::code(1, "version", &[VERSION]),
                FieldSpec::text(2, "receiver_id"),
                FieldSpec::text(3, "sender_id"),
                FieldSpec::text(4, "population_id"),
                FieldSpec::text(5, "transmission_id"),
                FieldSpec::timestamp(6, "sent_time"),
            ],
        ),
        RowSchema::new(RowKind::Detail, RecordType::Detail, detail_fields()),
        RowSchema::new(
            RowKind::Footer,
            RecordType::Trailer,
            vec![
                FieldSpec::integer(1, "processed_count"),
                FieldSpec::optional_integer(2, "medication_count"),
                FieldSpec::optional_integer(3, "medication_from_pbm_count"),
                FieldSpec::optional_integer(4, "medication_from_pharmacy_count"),
                FieldSpec::optional_integer(5, "patients_found"),
                FieldSpec::optional_integer(6, "patients_with_incomplete_history"),
                FieldSpec::optional_integer(7, "patients_with_no_history"),
                FieldSpec::optional_integer(8, "patients_not_found"),
                FieldSpec::optional_integer(9, "processing_errors"),
                FieldSpec::optional_integer(10, "patients_with_large_history"),
            ],
        ),
    )
});

pub fn schema() -> &'static FlatFileSchema {
    &SCHEMA
}

/// Parse a medication history response under the given row-error policy.
///
/// A footer whose processed count disagrees with the detail lines is logged,
/// not rejected; see [`processed_count_matches`].
pub fn parse(bytes: &[u8], policy: OnRowError) -> Result<ParsedFlatFile, CodecError> {
    let parsed = FileCodec::new(schema()).parse(bytes, policy)?;
    if !processed_count_matches(&parsed) {
        warn!(
            reported = parsed.footer.data.processed_count,
            actual = parsed.detail_line_count(),
            "Response footer processed count does not match its detail lines"
        );
    }
    Ok(parsed)
}

/// Whether the footer's processed count matches the detail lines actually read.
///
/// Rejected rows count as read. A mismatch is worth reporting but does not make
/// the file unusable.
pub fn processed_count_matches(parsed: &ParsedFlatFile) -> bool {
    usize::try_from(parsed.footer.data.processed_count)
        .is_ok_and(|count| count == parsed.detail_line_count())
}
