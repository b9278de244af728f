//! End-to-end patient load generation: domain patients in, wire bytes out, and
//! the verification that comes back reconciled against the request.

use insta::assert_snapshot;
use medhx_codec::OnRowError;
use medhx_dialects::{patient_load, verification};
use medhx_load::{
    Facility, Patient, PatientLoadRequest, SenderConfig, SkipReason, Transmission, TransmissionId,
    TransmissionKind, build_patient_load_file, reconcile,
};
use uuid::Uuid;

const CONFIG: &str = r#"
sender_id = "ACME"
sender_password = "secret"
receiver_id = "S00000000000001"
usage = "test"
assigning_authority = "2.16.840.1.113883.3.9621"
file_prefix = "Medhx"
"#;

const PATIENTS: &str = r#"[
  {
    "id": "00000000-0000-4000-8000-000000000001",
    "first_name": "Grace",
    "last_name": "Hopper",
    "dob": "1906-12-09",
    "gender_at_birth": "F"
  },
  {
    "id": "00000000-0000-4000-8000-000000000002",
    "first_name": "Ada Augusta",
    "last_name": "Lovelace",
    "dob": "1815-12-10",
    "gender_at_birth": "F",
    "address": {
      "address_line1": "12 St James's Square",
      "city": "New York",
      "state": "ny",
      "zip": "10001-0001"
    }
  },
  {
    "id": "00000000-0000-4000-8000-000000000003",
    "first_name": "Dr. Alan",
    "last_name": "Turing Jr.",
    "dob": "1912-06-23",
    "gender_at_birth": "X",
    "address": [
      {
        "address_line1": "1 Bletchley Park",
        "address_line2": "Apt 4",
        "city": "Milton Keynes",
        "state": "MK",
        "zip": "12345"
      }
    ]
  }
]"#;

fn patient_id(n: u8) -> Uuid {
    Uuid::parse_str(&format!("00000000-0000-4000-8000-00000000000{n}")).unwrap()
}

fn transmission() -> Transmission {
    let id = TransmissionId::parse("m5eqsfr8k7").unwrap();
    Transmission::with_id(TransmissionKind::Enroll, id, "1234567893", "cx1", false)
}

#[test]
fn patient_without_address_is_skipped() {
    let identity = SenderConfig::from_toml_str(CONFIG).unwrap();
    let patients: Vec<Patient> = serde_json::from_str(PATIENTS).unwrap();
    let transmission = transmission();
    let facility = Facility {
        id: "fac1".to_string(),
        npi: "1234567893".to_string(),
    };

    let file = build_patient_load_file(&PatientLoadRequest {
        identity: &identity,
        transmission: &transmission,
        facility: &facility,
        population_id: None,
        patients: &patients,
    })
    .unwrap();

    assert_eq!(file.requested_patient_ids, vec![patient_id(2), patient_id(3)]);
    assert_eq!(file.skipped.len(), 1);
    assert_eq!(file.skipped[0].patient_id, patient_id(1));
    assert!(matches!(file.skipped[0].reason, SkipReason::NoAddress));
    assert_eq!(
        transmission.request_file_name(&identity.file_prefix),
        "Medhx_PMA_20250102-m5eqsfr8k7"
    );

    let content = file.content.unwrap();
    let text = String::from_utf8(content.clone()).unwrap();
    assert_snapshot!(text.trim_end(), @r"
    HDR|3.0|ACME|secret|S00000000000001|m5eqsfr8k7fac1|12|m5eqsfr8k7|20250102|03040506|PMA|U|ADHOC|20250102|T
    PNM|2|2.16.840.1.113883.3.9621|00000000000040008000000000000002|Lovelace|Ada|Augusta|||12 St James's Square||New York|NY|100010001|18151210|F|1234567893|
    PNM|3|2.16.840.1.113883.3.9621|00000000000040008000000000000003|Turing|Alan||Dr.|Jr.|1 Bletchley Park|Apt 4|Milton Keynes|MK|12345|19120623|U|1234567893|
    TRL|2
    ");

    let parsed = patient_load::parse(&content, OnRowError::Fail).unwrap();
    assert_eq!(parsed.footer.data.total_records, 2);
    assert_eq!(parsed.details[1].data.prefix.as_deref(), Some("Dr."));
}

#[test]
fn verification_reconciles_against_request() {
    let requested = [patient_id(2), patient_id(3)];
    let bytes = format!(
        "HDR|3.0|ACME|S00000000000001|m5eqsfr8k7fac1|m5eqsfr8k7|20250102|03040506|PMA|U|ADHOC|02|File loaded with errors.|20250103\n\
         DTL|1|3|{}|E|E042|Invalid zip code|zip\n\
         TRL|2|1|1|1\n",
        patient_id(3).simple()
    );
    let parsed = verification::parse(bytes.as_bytes()).unwrap();

    let result = reconcile(&requested, &parsed);
    assert_eq!(result.transmission_id, "m5eqsfr8k7");
    assert_eq!(result.loaded, vec![patient_id(2)]);
    assert_eq!(result.rejected, vec![patient_id(3)]);
    assert!(result.footer_mismatches.is_empty());
}
