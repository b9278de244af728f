//! Reading incoming files for the `inspect` command.

use std::path::Path;

use anyhow::{Context, Result};
use medhx_codec::OnRowError;
use medhx_dialects::patient_load;
use medhx_dialects::response::{self, ParsedFlatFile};
use medhx_dialects::verification::{self, ParsedVerification};
use medhx_load::{Reconciliation, VerificationFileName, reconcile};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct VerificationInspection {
    /// Set when the file carries a verification name.
    pub name: Option<VerificationFileName>,
    pub file: ParsedVerification,
    /// Set when the acknowledged load file was supplied.
    pub reconciliation: Option<Reconciliation>,
}

#[derive(Debug, Serialize)]
pub struct ResponseInspection {
    pub file: ParsedFlatFile,
    /// Whether the footer's processed count equals the number of detail lines.
    pub processed_count_matches: bool,
}

/// Parse a verification file, optionally reconciling it with the load it acknowledges.
pub fn inspect_verification(path: &Path, load_file: Option<&Path>) -> Result<VerificationInspection> {
    let bytes = read_input(path)?;
    let file = verification::parse(&bytes)
        .with_context(|| format!("parse verification file {}", path.display()))?;
    info!(path = %path.display(), details = file.details.len(), "Read verification file");

    let reconciliation = match load_file {
        Some(load_path) => {
            let bytes = read_input(load_path)?;
            let load = patient_load::parse(&bytes, OnRowError::Fail)
                .with_context(|| format!("parse patient load file {}", load_path.display()))?;
            let requested: Vec<_> = load.detail_records().map(|detail| detail.patient_id).collect();
            Some(reconcile(&requested, &file))
        }
        None => None,
    };

    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(VerificationFileName::parse);

    Ok(VerificationInspection {
        name,
        file,
        reconciliation,
    })
}

/// Parse a flat-file response, capturing bad detail rows when `lenient`.
pub fn inspect_response(path: &Path, lenient: bool) -> Result<ResponseInspection> {
    let bytes = read_input(path)?;
    let policy = if lenient {
        OnRowError::CaptureAndContinue
    } else {
        OnRowError::Fail
    };
    let file = response::parse(&bytes, policy)
        .with_context(|| format!("parse flat-file response {}", path.display()))?;
    info!(
        path = %path.display(),
        details = file.details.len(),
        rejected = file.rejected.len(),
        "Read flat-file response"
    );
    Ok(ResponseInspection {
        processed_count_matches: response::processed_count_matches(&file),
        file,
    })
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read {}", path.display()))
}
