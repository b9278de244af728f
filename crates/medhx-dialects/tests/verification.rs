//! Verification acknowledgement scenarios.

use medhx_codec::CodeSet;
use medhx_dialects::codes::Severity;
use medhx_dialects::verification::{self, LoadStatus};
use uuid::Uuid;

const FILE: &str = "\
HDR|3.0|ACME|S00000000000001|lmq3k0a1x2fac1|lmq3k0a1x2|20250102|03040506|PMA|U|ADHOC|02|File loaded with errors.|20250103
DTL|1|2|0195f4a41e3c7b8e9c1a2b3c4d5e6f70|E|PNM013|Invalid zip code|zip
DTL|2|3|0195f4a41e3c7b8e9c1a2b3c4d5e6f71|W|PNM020|Middle name truncated|middle_name
DTL|3|4||F|PNM001|Unreadable record|
TRL|4|3|2|3
";

#[test]
fn test_loaded_with_errors() {
    let parsed = verification::parse(FILE.as_bytes()).unwrap();
    let header = &parsed.header.data;

    assert_eq!(header.load_status, LoadStatus::LoadedWithErrors);
    assert_eq!(
        header.load_status_description.as_deref(),
        Some(LoadStatus::LoadedWithErrors.description())
    );
    assert!(!parsed.details.is_empty());
    for detail in parsed.detail_records() {
        assert!(["W", "E", "F"].contains(&detail.severity.code()));
    }
}

#[test]
fn test_detail_fields() {
    let parsed = verification::parse(FILE.as_bytes()).unwrap();
    let details: Vec<_> = parsed.detail_records().collect();
    assert_eq!(details.len(), 3);

    assert_eq!(details[0].source_sequence, 2);
    assert_eq!(
        details[0].patient_id,
        Some(Uuid::parse_str("0195f4a4-1e3c-7b8e-9c1a-2b3c4d5e6f70").unwrap())
    );
    assert_eq!(details[0].severity, Severity::Error);
    assert_eq!(details[0].field_name.as_deref(), Some("zip"));

    assert_eq!(details[2].patient_id, None);
    assert_eq!(details[2].severity, Severity::Fatal);
    assert_eq!(details[2].field_name, None);

    let footer = parsed.footer.data;
    assert_eq!(footer.total_error_count as usize, details.len());
    assert_eq!(footer.processed_count, 4);
    assert_eq!(footer.loaded_count, 2);
}

#[test]
fn test_older_version_is_accepted() {
    let file = FILE.replacen("HDR|3.0|", "HDR|2.2|", 1);
    let parsed = verification::parse(file.as_bytes()).unwrap();
    assert_eq!(parsed.header.data.version, "2.2");
}

#[test]
fn test_bad_detail_is_fatal() {
    let file = FILE.replacen("|W|PNM020|", "|Q|PNM020|", 1);
    let err = verification::parse(file.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("line 3"), "{err}");
    let raw = err.raw_row().unwrap();
    assert_eq!(raw.get(4), "Q");
}
