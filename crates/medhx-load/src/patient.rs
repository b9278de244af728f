//! Domain records a load file is built from.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    /// Given names, optionally led by an honorific.
    pub first_name: String,
    /// Family name, optionally followed by a generational suffix.
    pub last_name: String,
    /// `CCYY-MM-DD`.
    pub dob: String,
    /// `M`, `F`, `O` or `U`.
    #[serde(default)]
    pub gender_at_birth: String,
    /// Either one address or a list; only the first is sent.
    #[serde(default, deserialize_with = "one_or_many")]
    pub address: Vec<Address>,
}

impl Patient {
    pub fn primary_address(&self) -> Option<&Address> {
        self.address.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// The facility the history is requested for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub id: String,
    pub npi: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Address>),
    One(Address),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Address>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::Many(addresses)) => addresses,
        Some(OneOrMany::One(address)) => vec![address],
        None => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = r#"{"address_line1":"1 Main St","city":"Springfield","state":"IL","zip":"62701"}"#;

    fn patient_json(address: &str) -> String {
        format!(
            r#"{{"id":"0195f4a4-1e3c-7b8e-9c1a-2b3c4d5e6f70","first_name":"Ada","last_name":"Lovelace","dob":"1815-12-10","gender_at_birth":"F"{address}}}"#
        )
    }

    #[test]
    fn test_single_address() {
        let json = patient_json(&format!(r#","address":{ADDRESS}"#));
        let patient: Patient = serde_json::from_str(&json).unwrap();
        assert_eq!(patient.address.len(), 1);
        assert_eq!(patient.primary_address().unwrap().city, "Springfield");
    }

    #[test]
    fn test_address_list() {
        let json = patient_json(&format!(r#","address":[{ADDRESS},{ADDRESS}]"#));
        let patient: Patient = serde_json::from_str(&json).unwrap();
        assert_eq!(patient.address.len(), 2);
    }

    #[test]
    fn test_missing_or_null_address() {
        let patient: Patient = serde_json::from_str(&patient_json("")).unwrap();
        assert!(patient.primary_address().is_none());

        let patient: Patient = serde_json::from_str(&patient_json(r#","address":null"#)).unwrap();
        assert!(patient.primary_address().is_none());
    }
}
