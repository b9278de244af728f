//! Names of the files exchanged over the transfer.
//!
//! | File | Name |
//! |------|------|
//! | patient load request | `{prefix}_PMA_{CCYYMMDD}-{transmission id}[.gz]` |
//! | verification | `{request without .gz}.{unix ms}.rsp` or `.gz-extract` |
//! | flat-file response | `{customer id}..._{CCYYMMDDHHMMSS}.gz` |
//! | history copy | `{request}.{sender id}` |

use std::fmt;

use chrono::{DateTime, Utc};
use medhx_dialects::patient_load::FILE_TYPE;
use serde::Serialize;

use crate::transmission::TransmissionId;

const GZIP_EXTENSION: &str = ".gz";
const PLAIN_VERIFICATION: &str = "rsp";
const COMPRESSED_VERIFICATION: &str = "gz-extract";

/// Name of a patient load request, dated by its transmission id.
pub fn request_file_name(prefix: &str, id: &TransmissionId, compressed: bool) -> String {
    let date = id.timestamp().format("%Y%m%d");
    let extension = if compressed { GZIP_EXTENSION } else { "" };
    format!("{prefix}_{FILE_TYPE}_{date}-{id}{extension}")
}

/// Request name with any `.gz` extension removed.
pub fn strip_gzip_extension(name: &str) -> &str {
    name.strip_suffix(GZIP_EXTENSION).unwrap_or(name)
}

/// Trailing part of the name of a flat-file response delivered at `at`.
pub fn flat_file_response_suffix(at: DateTime<Utc>) -> String {
    format!("_{}{GZIP_EXTENSION}", at.format("%Y%m%d%H%M%S"))
}

/// Whether `name` is the flat-file response for `customer_id` delivered at `at`.
pub fn is_flat_file_response(name: &str, customer_id: &str, at: DateTime<Utc>) -> bool {
    name.starts_with(customer_id) && name.ends_with(&flat_file_response_suffix(at))
}

/// Name under which a request is archived for a sender.
pub fn history_file_name(request_file_name: &str, sender_id: &str) -> String {
    format!("{request_file_name}.{sender_id}")
}

/// Name of a verification file, tying it to the request it acknowledges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationFileName {
    /// Request name without its `.gz` extension.
    pub request_file_name: String,
    /// When the clearinghouse accepted the request.
    pub accepted_at: DateTime<Utc>,
    /// Whether the acknowledged request was compressed.
    pub compressed: bool,
}

impl VerificationFileName {
    pub fn new(request_file_name: &str, accepted_at: DateTime<Utc>) -> Self {
        Self {
            request_file_name: strip_gzip_extension(request_file_name).to_string(),
            accepted_at,
            compressed: request_file_name.ends_with(GZIP_EXTENSION),
        }
    }

    /// Parse `{request}.{unix ms}.{rsp|gz-extract}`; `None` for any other name.
    pub fn parse(name: &str) -> Option<Self> {
        let mut parts = name.split('.');
        let request = parts.next().filter(|part| !part.is_empty())?;
        let millis = parts.next()?;
        let compressed = match parts.next()? {
            PLAIN_VERIFICATION => false,
            COMPRESSED_VERIFICATION => true,
            _ => return None,
        };
        if parts.next().is_some() {
            return None;
        }
        if millis.is_empty() || !millis.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let accepted_at = DateTime::from_timestamp_millis(millis.parse().ok()?)?;
        Some(Self {
            request_file_name: request.to_string(),
            accepted_at,
            compressed,
        })
    }

    /// Whether this verification acknowledges `request_file_name`.
    pub fn acknowledges(&self, request_file_name: &str) -> bool {
        self.request_file_name == strip_gzip_extension(request_file_name)
    }
}

impl fmt::Display for VerificationFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extension = if self.compressed {
            COMPRESSED_VERIFICATION
        } else {
            PLAIN_VERIFICATION
        };
        write!(
            f,
            "{}.{}.{extension}",
            self.request_file_name,
            self.accepted_at.timestamp_millis()
        )
    }
}
