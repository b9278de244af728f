//! Building patient load files from domain patients.
//!
//! A patient that cannot be expressed on the wire (no address, a malformed date
//! of birth, a field the schema rejects) is left out of the file and reported in
//! [`PatientLoadFile::skipped`]; the rest of the batch is still sent.

use chrono::{NaiveTime, Timelike};
use medhx_codec::{RowError, encode_row};
use medhx_dialects::codes::{FileAction, FileSchedule};
use medhx_dialects::patient_load::{
    self, PatientLoadDetail, PatientLoadFooter, PatientLoadHeader,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::SenderConfig;
use crate::demographics::{map_gender, normalize_state, normalize_zip, parse_date_of_birth, split_name};
use crate::error::{LoadError, Result};
use crate::patient::{Facility, Patient};
use crate::redact::redact_value;
use crate::transmission::Transmission;

/// Everything a patient load file is built from.
#[derive(Debug, Clone, Copy)]
pub struct PatientLoadRequest<'a> {
    pub identity: &'a SenderConfig,
    pub transmission: &'a Transmission,
    pub facility: &'a Facility,
    /// Population the patients belong to; the facility id when absent.
    pub population_id: Option<&'a str>,
    pub patients: &'a [Patient],
}

#[derive(Debug, thiserror::Error)]
pub enum SkipReason {
    #[error("patient has no address")]
    NoAddress,

    #[error("date of birth is not CCYY-MM-DD")]
    InvalidDateOfBirth,

    #[error(transparent)]
    Rejected(#[from] RowError),
}

#[derive(Debug)]
pub struct SkippedPatient {
    pub patient_id: Uuid,
    /// Sequence number the patient would have had.
    pub sequence: u32,
    pub reason: SkipReason,
}

#[derive(Debug)]
pub struct PatientLoadFile {
    /// Encoded file; `None` when no patient could be included.
    pub content: Option<Vec<u8>>,
    /// Ids of the included patients, in file order.
    pub requested_patient_ids: Vec<Uuid>,
    pub skipped: Vec<SkippedPatient>,
}

impl PatientLoadFile {
    /// The encoded file, or [`LoadError::NoPatients`] when it would be empty.
    pub fn into_content(self) -> Result<Vec<u8>> {
        self.content.ok_or(LoadError::NoPatients)
    }
}

/// Build the load file for a batch of patients.
///
/// Sequence numbers follow the position in `request.patients`, so a skipped
/// patient leaves a gap. Header and footer failures are returned as errors.
pub fn build_patient_load_file(request: &PatientLoadRequest<'_>) -> Result<PatientLoadFile> {
    let transmission = request.transmission;
    let header = load_header(request);

    let mut details = Vec::with_capacity(request.patients.len());
    let mut requested_patient_ids = Vec::with_capacity(request.patients.len());
    let mut skipped = Vec::new();

    for (index, patient) in request.patients.iter().enumerate() {
        let sequence = u32::try_from(index + 1).unwrap_or(u32::MAX);
        match load_detail(request, patient, sequence) {
            Ok(detail) => {
                requested_patient_ids.push(patient.id);
                details.push(detail);
            }
            Err(reason) => {
                warn!(
                    transmission_id = %transmission.id,
                    patient_id = redact_value(&patient.id.to_string()),
                    sequence,
                    reason = %reason,
                    "Skipped patient"
                );
                skipped.push(SkippedPatient {
                    patient_id: patient.id,
                    sequence,
                    reason,
                });
            }
        }
    }

    let content = if details.is_empty() {
        None
    } else {
        let footer = PatientLoadFooter {
            total_records: u32::try_from(details.len()).unwrap_or(u32::MAX),
        };
        Some(patient_load::serialize(&header, &details, &footer)?)
    };

    debug!(
        transmission_id = %transmission.id,
        included = requested_patient_ids.len(),
        skipped = skipped.len(),
        "Built patient load file"
    );

    Ok(PatientLoadFile {
        content,
        requested_patient_ids,
        skipped,
    })
}

/// Build the load file for a single patient, whose id is the population id.
///
/// Returns `None` when the patient could not be included.
pub fn build_patient_request_file(
    identity: &SenderConfig,
    transmission: &Transmission,
    facility: &Facility,
    patient: &Patient,
) -> Result<Option<Vec<u8>>> {
    let population_id = patient.id.to_string();
    let file = build_patient_load_file(&PatientLoadRequest {
        identity,
        transmission,
        facility,
        population_id: Some(&population_id),
        patients: std::slice::from_ref(patient),
    })?;
    Ok(file.content)
}

fn load_header(request: &PatientLoadRequest<'_>) -> PatientLoadHeader {
    let identity = request.identity;
    let id = &request.transmission.id;
    let created_at = id.timestamp();
    let population = request.population_id.unwrap_or(request.facility.id.as_str());

    PatientLoadHeader {
        sender_id: identity.sender_id.clone(),
        sender_password: identity.sender_password.clone(),
        receiver_id: identity.receiver_id.clone(),
        population_id: format!("{id}{population}"),
        look_back_months: identity.look_back_months,
        transmission_id: id.to_string(),
        transmission_date: created_at.date_naive(),
        transmission_time: to_centiseconds(created_at.time()),
        action: FileAction::Update,
        schedule: FileSchedule::AdHoc,
        extract_date: created_at.date_naive(),
        usage: identity.usage.usage(),
    }
}

fn load_detail(
    request: &PatientLoadRequest<'_>,
    patient: &Patient,
    sequence: u32,
) -> std::result::Result<PatientLoadDetail, SkipReason> {
    let address = patient.primary_address().ok_or(SkipReason::NoAddress)?;
    let date_of_birth = parse_date_of_birth(&patient.dob).ok_or(SkipReason::InvalidDateOfBirth)?;
    let name = split_name(&patient.first_name, &patient.last_name);

    let detail = PatientLoadDetail {
        sequence,
        assigning_authority: request.identity.assigning_authority.clone(),
        patient_id: patient.id,
        last_name: name.last,
        first_name: name.first,
        middle_name: name.middle,
        prefix: name.prefix,
        suffix: name.suffix,
        address_line1: address.address_line1.trim().to_string(),
        address_line2: address
            .address_line2
            .as_deref()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string),
        city: address.city.trim().to_string(),
        state: normalize_state(&address.state),
        zip: normalize_zip(&address.zip),
        date_of_birth,
        gender: map_gender(&patient.gender_at_birth),
        npi: request.facility.npi.clone(),
        end_monitoring_date: None,
    };
    encode_row(&detail, patient_load::schema().detail())?;
    Ok(detail)
}

/// The load header carries centiseconds; finer precision is dropped.
fn to_centiseconds(time: NaiveTime) -> NaiveTime {
    let nanos = time.nanosecond() / 10_000_000 * 10_000_000;
    time.with_nanosecond(nanos).unwrap_or(time)
}

#[cfg(test)]
mod tests {
    use medhx_codec::OnRowError;
    use medhx_dialects::codes::Usage;

    use super::*;
    use crate::patient::Address;
    use crate::transmission::{TransmissionId, TransmissionKind};

    fn identity() -> SenderConfig {
        SenderConfig::from_toml_str(
            r#"
sender_id = "ACME"
sender_password = "secret"
receiver_id = "S00000000000001"
assigning_authority = "2.16.840.1.113883.3.9621"
file_prefix = "Medhx"
"#,
        )
        .unwrap()
    }

    fn transmission() -> Transmission {
        let id = TransmissionId::parse("m5eqsfr8k7").unwrap();
        Transmission::with_id(TransmissionKind::Enroll, id, "1234567893", "cx1", false)
    }

    fn facility() -> Facility {
        Facility {
            id: "fac1".to_string(),
            npi: "1234567893".to_string(),
        }
    }

    fn patient(n: u128) -> Patient {
        Patient {
            id: Uuid::from_u128(n),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            dob: "1815-12-10".to_string(),
            gender_at_birth: "F".to_string(),
            address: vec![Address {
                address_line1: "1 Main St".to_string(),
                address_line2: Some(" ".to_string()),
                city: "Springfield".to_string(),
                state: "il".to_string(),
                zip: "62701".to_string(),
            }],
        }
    }

    fn build(patients: &[Patient], population_id: Option<&str>) -> PatientLoadFile {
        let identity = identity();
        let transmission = transmission();
        let facility = facility();
        build_patient_load_file(&PatientLoadRequest {
            identity: &identity,
            transmission: &transmission,
            facility: &facility,
            population_id,
            patients,
        })
        .unwrap()
    }

    #[test]
    fn test_header_fields() {
        let file = build(&[patient(1)], None);
        let parsed = patient_load::parse(&file.content.unwrap(), OnRowError::Fail).unwrap();
        let header = parsed.header.data;
        assert_eq!(header.population_id, "m5eqsfr8k7fac1");
        assert_eq!(header.transmission_id, "m5eqsfr8k7");
        assert_eq!(header.transmission_date.to_string(), "2025-01-02");
        assert_eq!(header.transmission_time.to_string(), "03:04:05.060");
        assert_eq!(header.look_back_months, 12);
        assert_eq!(header.usage, Usage::Test);
        assert_eq!(parsed.details[0].data.state, "IL");
        assert_eq!(parsed.details[0].data.address_line2, None);
    }

    #[test]
    fn test_explicit_population() {
        let file = build(&[patient(1)], Some("pop"));
        let parsed = patient_load::parse(&file.content.unwrap(), OnRowError::Fail).unwrap();
        assert_eq!(parsed.header.data.population_id, "m5eqsfr8k7pop");
    }

    #[test]
    fn test_partial_failures_keep_sequence_gaps() {
        let mut bad_dob = patient(2);
        bad_dob.dob = "12/10/1815".to_string();
        let mut bad_zip = patient(3);
        bad_zip.address[0].zip = "123".to_string();

        let file = build(&[patient(1), bad_dob, bad_zip, patient(4)], None);
        assert_eq!(file.requested_patient_ids, vec![Uuid::from_u128(1), Uuid::from_u128(4)]);
        assert_eq!(file.skipped.len(), 2);
        assert!(matches!(file.skipped[0].reason, SkipReason::InvalidDateOfBirth));
        assert_eq!(file.skipped[0].sequence, 2);
        assert!(matches!(file.skipped[1].reason, SkipReason::Rejected(_)));

        let parsed = patient_load::parse(&file.content.unwrap(), OnRowError::Fail).unwrap();
        let sequences: Vec<u32> = parsed.detail_records().map(|d| d.sequence).collect();
        assert_eq!(sequences, vec![1, 4]);
        assert_eq!(parsed.footer.data.total_records, 2);
    }

    #[test]
    fn test_no_patients_means_no_content() {
        let mut homeless = patient(1);
        homeless.address.clear();
        let file = build(&[homeless], None);
        assert!(file.content.is_none());
        assert!(matches!(file.skipped[0].reason, SkipReason::NoAddress));
        assert!(matches!(file.into_content(), Err(LoadError::NoPatients)));

        assert!(build(&[], None).content.is_none());
    }

    #[test]
    fn test_single_patient_request() {
        let identity = identity();
        let transmission = transmission();
        let facility = facility();

        let content =
            build_patient_request_file(&identity, &transmission, &facility, &patient(7))
                .unwrap()
                .unwrap();
        let parsed = patient_load::parse(&content, OnRowError::Fail).unwrap();
        assert_eq!(
            parsed.header.data.population_id,
            format!("m5eqsfr8k7{}", Uuid::from_u128(7))
        );

        let mut homeless = patient(8);
        homeless.address.clear();
        assert_eq!(
            build_patient_request_file(&identity, &transmission, &facility, &homeless).unwrap(),
            None
        );
    }

    #[test]
    fn test_centisecond_truncation() {
        let time = NaiveTime::from_hms_nano_opt(1, 2, 3, 456_789_000).unwrap();
        assert_eq!(
            to_centiseconds(time),
            NaiveTime::from_hms_milli_opt(1, 2, 3, 450).unwrap()
        );
    }
}
