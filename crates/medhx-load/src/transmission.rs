//! Transmission ids and the transmissions they name.
//!
//! A transmission id is 10 lowercase base-36 characters: the first 8 encode the
//! creation time in milliseconds since the Unix epoch, the last 2 are random. Ids
//! therefore sort by creation time and the time can be recovered from the id.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LoadError, Result};
use crate::naming;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TIME_CHARS: usize = 8;
const RANDOM_CHARS: usize = 2;
/// First instant that no longer fits in the time characters (year 2059).
const MAX_MILLIS: u64 = 36u64.pow(TIME_CHARS as u32);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransmissionId(String);

impl TransmissionId {
    pub const LEN: usize = TIME_CHARS + RANDOM_CHARS;

    /// A fresh id for the current instant.
    pub fn generate() -> Result<Self> {
        Self::generate_at(Utc::now())
    }

    pub fn generate_at(at: DateTime<Utc>) -> Result<Self> {
        let mut random = [0u8; RANDOM_CHARS];
        getrandom::fill(&mut random).map_err(|e| LoadError::Entropy {
            message: e.to_string(),
        })?;
        Self::from_parts(at, random)
    }

    /// Build an id from its creation time and random bytes.
    pub fn from_parts(at: DateTime<Utc>, random: [u8; RANDOM_CHARS]) -> Result<Self> {
        let millis = u64::try_from(at.timestamp_millis())
            .ok()
            .filter(|millis| *millis < MAX_MILLIS)
            .ok_or_else(|| LoadError::InvalidTransmissionId {
                value: at.to_rfc3339(),
                reason: "creation time cannot be encoded",
            })?;
        let mut id = to_base36(millis);
        id.extend(
            random
                .iter()
                .map(|byte| char::from(ALPHABET[usize::from(*byte) % ALPHABET.len()])),
        );
        Ok(Self(id))
    }

    pub fn parse(value: &str) -> Result<Self> {
        let invalid = |reason| LoadError::InvalidTransmissionId {
            value: value.to_string(),
            reason,
        };
        if value.len() != Self::LEN {
            return Err(invalid("must be 10 characters"));
        }
        if !value.bytes().all(|b| ALPHABET.contains(&b)) {
            return Err(invalid("must be lowercase base-36"));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The instant the id was created.
    pub fn timestamp(&self) -> DateTime<Utc> {
        let millis = self.0[..TIME_CHARS].bytes().fold(0i64, |acc, byte| {
            let digit = ALPHABET.iter().position(|c| *c == byte).unwrap_or_default();
            acc * 36 + digit as i64
        });
        DateTime::from_timestamp_millis(millis).unwrap_or_default()
    }
}

fn to_base36(mut value: u64) -> String {
    let mut digits = [b'0'; TIME_CHARS];
    for slot in digits.iter_mut().rev() {
        *slot = ALPHABET[(value % 36) as usize];
        value /= 36;
    }
    digits.iter().map(|b| char::from(*b)).collect()
}

impl fmt::Display for TransmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TransmissionId {
    type Err = LoadError;

    fn from_str(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl TryFrom<String> for TransmissionId {
    type Error = LoadError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<TransmissionId> for String {
    fn from(id: TransmissionId) -> Self {
        id.0
    }
}

/// Whether patients are added to or removed from monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransmissionKind {
    #[serde(rename = "ENR")]
    Enroll,
    #[serde(rename = "UNR")]
    Unenroll,
}

/// One request sent to the clearinghouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transmission {
    pub kind: TransmissionKind,
    pub id: TransmissionId,
    /// NPI of the requesting facility.
    pub npi: String,
    pub customer_id: String,
    pub created_at: DateTime<Utc>,
    /// Whether the request file is gzip-compressed before upload.
    pub compression: bool,
}

impl Transmission {
    pub fn new(
        kind: TransmissionKind,
        npi: impl Into<String>,
        customer_id: impl Into<String>,
        compression: bool,
    ) -> Result<Self> {
        Ok(Self::with_id(
            kind,
            TransmissionId::generate()?,
            npi,
            customer_id,
            compression,
        ))
    }

    /// A transmission created when `id` was.
    pub fn with_id(
        kind: TransmissionKind,
        id: TransmissionId,
        npi: impl Into<String>,
        customer_id: impl Into<String>,
        compression: bool,
    ) -> Self {
        Self {
            kind,
            created_at: id.timestamp(),
            id,
            npi: npi.into(),
            customer_id: customer_id.into(),
            compression,
        }
    }

    /// Name the request file is uploaded under.
    pub fn request_file_name(&self, prefix: &str) -> String {
        naming::request_file_name(prefix, &self.id, self.compression)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;

    use super::*;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap() + chrono::TimeDelta::milliseconds(60)
    }

    #[test]
    fn test_from_parts() {
        let id = TransmissionId::from_parts(instant(), [200, 7]).unwrap();
        assert_eq!(id.as_str(), "m5eqsfr8k7");
        assert_eq!(id.timestamp(), instant());
    }

    #[test]
    fn test_generate() {
        let id = TransmissionId::generate_at(instant()).unwrap();
        assert_eq!(id.as_str().len(), TransmissionId::LEN);
        assert!(id.as_str().starts_with("m5eqsfr8"));
    }

    #[test]
    fn test_parse() {
        assert!(TransmissionId::parse("m5eqsfr8k7").is_ok());
        assert!(TransmissionId::parse("m5eqsfr8k").is_err());
        assert!(TransmissionId::parse("M5EQSFR8K7").is_err());
        assert!(TransmissionId::parse("m5eqsfr8-7").is_err());
    }

    #[test]
    fn test_before_epoch_is_rejected() {
        let at = Utc.with_ymd_and_hms(1969, 12, 31, 0, 0, 0).unwrap();
        assert!(matches!(
            TransmissionId::from_parts(at, [0, 0]),
            Err(LoadError::InvalidTransmissionId { .. })
        ));
    }

    #[test]
    fn test_transmission_created_at_matches_id() {
        let id = TransmissionId::from_parts(instant(), [0, 0]).unwrap();
        let transmission = Transmission::with_id(TransmissionKind::Enroll, id, "1234567893", "cx", true);
        assert_eq!(transmission.created_at, instant());
        assert_eq!(
            transmission.request_file_name("Medhx"),
            "Medhx_PMA_20250102-m5eqsfr800.gz"
        );
    }

    #[test]
    fn test_serde_as_string() {
        let id = TransmissionId::parse("m5eqsfr8k7").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"m5eqsfr8k7\"");
        assert!(serde_json::from_str::<TransmissionId>("\"short\"").is_err());
        assert_eq!(
            serde_json::to_string(&TransmissionKind::Unenroll).unwrap(),
            "\"UNR\""
        );
    }

    proptest! {
        #[test]
        fn timestamp_survives_the_id(millis in 0i64..2_821_109_907_455, a: u8, b: u8) {
            let at = DateTime::from_timestamp_millis(millis).unwrap();
            let id = TransmissionId::from_parts(at, [a, b]).unwrap();
            prop_assert_eq!(TransmissionId::parse(id.as_str()).unwrap().timestamp(), at);
        }
    }
}
