//! Outgoing patient loads and the bookkeeping around them.
//!
//! - [`config`]: sender identity loaded from TOML
//! - [`transmission`]: time-ordered transmission ids
//! - [`batch`]: turning domain patients into a patient load file
//! - [`naming`]: request, verification and response file names
//! - [`reconcile`]: matching a verification file to the requested patients

pub mod batch;
pub mod config;
pub mod demographics;
mod error;
pub mod naming;
pub mod patient;
pub mod reconcile;
pub mod redact;
pub mod transmission;

pub use batch::{
    PatientLoadFile, PatientLoadRequest, SkipReason, SkippedPatient, build_patient_load_file,
    build_patient_request_file,
};
pub use config::{Environment, SenderConfig};
pub use error::{LoadError, Result};
pub use naming::VerificationFileName;
pub use patient::{Address, Facility, Patient};
pub use reconcile::{Reconciliation, reconcile};
pub use transmission::{Transmission, TransmissionId, TransmissionKind};
