//! Integration tests for the `inspect` command.

use std::path::{Path, PathBuf};

use insta::assert_json_snapshot;
use medhx_cli::inspect::{inspect_response, inspect_verification};
use uuid::Uuid;

const LOAD_FILE: &str = "HDR|3.0|ACME|secret|S00000000000001|m5eqsfr8k7fac1|12|m5eqsfr8k7|20250102|03040506|PMA|U|ADHOC|20250102|T
PNM|1|2.16.840.1.113883.3.9621|00000000000040008000000000000001|Lovelace|Ada||||1 Main St||Springfield|IL|62701|18151210|F|1234567893|
PNM|2|2.16.840.1.113883.3.9621|00000000000040008000000000000002|Hopper|Grace||||2 Main St||Springfield|IL|62701|19061209|F|1234567893|
TRL|2
";

const VERIFICATION: &str = "HDR|3.0|ACME|S00000000000001|m5eqsfr8k7fac1|m5eqsfr8k7|20250102|03040506|PMA|U|ADHOC|02|File loaded with errors.|20250103
DTL|1|2|00000000000040008000000000000002|E|E042|Invalid zip code|zip
TRL|2|1|1|1
";

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("medhx-cli-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn verification_is_reconciled_with_its_load_file() {
    let dir = scratch_dir();
    let load = write(&dir, "Medhx_PMA_20250102-m5eqsfr8k7", LOAD_FILE);
    let verification = write(
        &dir,
        "Medhx_PMA_20250102-m5eqsfr8k7.1735787045060.rsp",
        VERIFICATION,
    );

    let inspection = inspect_verification(&verification, Some(&load)).unwrap();
    let name = inspection.name.as_ref().unwrap();
    assert_eq!(name.request_file_name, "Medhx_PMA_20250102-m5eqsfr8k7");
    assert!(!name.compressed);

    assert_json_snapshot!(inspection.reconciliation.unwrap(), @r#"
    {
      "transmission_id": "m5eqsfr8k7",
      "load_status": "02",
      "loaded": [
        "00000000-0000-4000-8000-000000000001"
      ],
      "rejected": [
        "00000000-0000-4000-8000-000000000002"
      ],
      "warned": [],
      "unknown": [],
      "unattributed": 0,
      "footer_mismatches": []
    }
    "#);

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn verification_without_load_file_is_not_reconciled() {
    let dir = scratch_dir();
    let verification = write(&dir, "ack.txt", VERIFICATION);

    let inspection = inspect_verification(&verification, None).unwrap();
    assert!(inspection.name.is_none());
    assert!(inspection.reconciliation.is_none());
    assert_eq!(inspection.file.details.len(), 1);

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn broken_verification_reports_the_line() {
    let dir = scratch_dir();
    let broken = VERIFICATION.replace("|E|E042", "|X|E042");
    let verification = write(&dir, "ack.txt", &broken);

    let err = inspect_verification(&verification, None).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("parse verification file"), "{message}");
    assert!(message.contains("line 2"), "{message}");

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn missing_response_file_is_an_error() {
    let err = inspect_response(Path::new("/nonexistent/response.gz"), true).unwrap_err();
    assert!(format!("{err:#}").starts_with("read /nonexistent/response.gz"));
}
