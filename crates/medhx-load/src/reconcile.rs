//! Matching a verification file against the patients that were requested.

use std::collections::BTreeSet;

use medhx_dialects::codes::Severity;
use medhx_dialects::verification::{LoadStatus, ParsedVerification};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

/// A footer counter that disagrees with the file body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountMismatch {
    pub counter: &'static str,
    pub reported: u32,
    pub actual: usize,
}

/// Outcome of a load, per requested patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub transmission_id: String,
    pub load_status: LoadStatus,
    /// Requested patients without a problem, or with warnings only.
    pub loaded: Vec<Uuid>,
    /// Requested patients with an error or fatal problem.
    pub rejected: Vec<Uuid>,
    /// Loaded patients that drew at least one warning.
    pub warned: Vec<Uuid>,
    /// Patients reported on but never requested.
    pub unknown: Vec<Uuid>,
    /// Problems that name no patient.
    pub unattributed: usize,
    pub footer_mismatches: Vec<CountMismatch>,
}

impl Reconciliation {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.unknown.is_empty() && self.footer_mismatches.is_empty()
    }
}

/// Sort `requested` patients by what the verification says about them.
///
/// A rejected file rejects every requested patient. Footer counters are checked
/// against the body and reported, never enforced.
pub fn reconcile(requested: &[Uuid], verification: &ParsedVerification) -> Reconciliation {
    let header = &verification.header.data;
    let requested_set: BTreeSet<Uuid> = requested.iter().copied().collect();

    let mut rejected_ids = BTreeSet::new();
    let mut warned_ids = BTreeSet::new();
    let mut unknown = Vec::new();
    let mut unattributed = 0;

    for detail in verification.detail_records() {
        let Some(patient_id) = detail.patient_id else {
            unattributed += 1;
            continue;
        };
        if !requested_set.contains(&patient_id) {
            if !unknown.contains(&patient_id) {
                unknown.push(patient_id);
            }
            continue;
        }
        match detail.severity {
            Severity::Warning => warned_ids.insert(patient_id),
            Severity::Error | Severity::Fatal => rejected_ids.insert(patient_id),
        };
    }

    let file_rejected = header.load_status == LoadStatus::Rejected;
    let (rejected, loaded): (Vec<Uuid>, Vec<Uuid>) = requested
        .iter()
        .copied()
        .partition(|id| file_rejected || rejected_ids.contains(id));
    let warned = loaded
        .iter()
        .copied()
        .filter(|id| warned_ids.contains(id))
        .collect();

    let footer_mismatches = footer_mismatches(requested.len(), verification);
    for mismatch in &footer_mismatches {
        warn!(
            transmission_id = %header.transmission_id,
            counter = mismatch.counter,
            reported = mismatch.reported,
            actual = mismatch.actual,
            "Verification footer disagrees with its body"
        );
    }

    debug!(
        transmission_id = %header.transmission_id,
        loaded = loaded.len(),
        rejected = rejected.len(),
        unknown = unknown.len(),
        "Reconciled verification"
    );

    Reconciliation {
        transmission_id: header.transmission_id.clone(),
        load_status: header.load_status,
        loaded,
        rejected,
        warned,
        unknown,
        unattributed,
        footer_mismatches,
    }
}

fn footer_mismatches(requested: usize, verification: &ParsedVerification) -> Vec<CountMismatch> {
    let footer = &verification.footer.data;
    [
        ("processed_count", footer.processed_count, requested),
        (
            "total_error_count",
            footer.total_error_count,
            verification.detail_line_count(),
        ),
    ]
    .into_iter()
    .filter(|(_, reported, actual)| usize::try_from(*reported).ok() != Some(*actual))
    .map(|(counter, reported, actual)| CountMismatch {
        counter,
        reported,
        actual,
    })
    .collect()
}
