//! Building and writing a patient load file for the `load` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use medhx_load::naming::history_file_name;
use medhx_load::{
    Facility, Patient, PatientLoadRequest, SenderConfig, SkippedPatient, Transmission,
    TransmissionKind, build_patient_load_file,
};
use tracing::{info, info_span, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Sender configuration (TOML).
    pub config: PathBuf,
    /// JSON array of patients.
    pub patients: PathBuf,
    pub out_dir: PathBuf,
    pub facility: Facility,
    pub customer_id: String,
    pub population_id: Option<String>,
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub transmission: Transmission,
    /// Name the request is uploaded under.
    pub file_name: String,
    /// Name the request is archived under.
    pub history_file_name: String,
    /// Where the file was written; `None` when no patient could be included.
    pub written: Option<PathBuf>,
    pub requested_patient_ids: Vec<Uuid>,
    pub skipped: Vec<SkippedPatient>,
}

pub fn run_load(options: &LoadOptions) -> Result<LoadOutcome> {
    let identity = SenderConfig::load(&options.config).context("load sender configuration")?;
    let patients = read_patients(&options.patients)?;
    let transmission = Transmission::new(
        TransmissionKind::Enroll,
        options.facility.npi.as_str(),
        options.customer_id.as_str(),
        false,
    )?;
    let span = info_span!("load", transmission_id = %transmission.id);
    let _guard = span.enter();

    let file = build_patient_load_file(&PatientLoadRequest {
        identity: &identity,
        transmission: &transmission,
        facility: &options.facility,
        population_id: options.population_id.as_deref(),
        patients: &patients,
    })?;

    let file_name = transmission.request_file_name(&identity.file_prefix);
    let written = match &file.content {
        Some(content) => {
            std::fs::create_dir_all(&options.out_dir)
                .with_context(|| format!("create {}", options.out_dir.display()))?;
            let path = options.out_dir.join(&file_name);
            std::fs::write(&path, content).with_context(|| format!("write {}", path.display()))?;
            info!(
                path = %path.display(),
                patients = file.requested_patient_ids.len(),
                "Wrote patient load file"
            );
            Some(path)
        }
        None => {
            warn!(patients = patients.len(), "No patient could be included; nothing written");
            None
        }
    };

    Ok(LoadOutcome {
        history_file_name: history_file_name(&file_name, &identity.sender_id),
        file_name,
        transmission,
        written,
        requested_patient_ids: file.requested_patient_ids,
        skipped: file.skipped,
    })
}

fn read_patients(path: &Path) -> Result<Vec<Patient>> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse patients {}", path.display()))
}
