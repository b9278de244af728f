//! Compressed UUID fields.
//!
//! Identifiers travel as the 32 hexadecimal digits of a UUID with the dashes
//! removed. [`from_wire`] and [`to_wire`] work on text and keep the case of
//! their input; [`decode`] and [`encode`] go through [`Uuid`], which writes
//! lowercase.

use uuid::Uuid;

use crate::error::FieldError;

/// Dash positions of the canonical form, as group lengths.
const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

/// Remove the dashes of a dashed UUID.
pub fn to_wire(dashed: &str) -> String {
    dashed.chars().filter(|ch| *ch != '-').collect()
}

/// Re-insert the dashes into a 32-digit wire identifier.
pub fn from_wire(raw: &str) -> Result<String, FieldError> {
    if raw.len() != 32 || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid(raw));
    }
    let mut dashed = String::with_capacity(36);
    let mut start = 0;
    for (index, len) in GROUPS.iter().enumerate() {
        if index > 0 {
            dashed.push('-');
        }
        dashed.push_str(&raw[start..start + len]);
        start += len;
    }
    Ok(dashed)
}

/// Decode a compressed UUID; blank is `None` when optional.
pub fn decode(raw: &str, optional: bool) -> Result<Option<Uuid>, FieldError> {
    let value = raw.trim();
    if value.is_empty() {
        return if optional {
            Ok(None)
        } else {
            Err(FieldError::MissingValue)
        };
    }
    let dashed = from_wire(value)?;
    Uuid::try_parse(&dashed).map(Some).map_err(|_| invalid(value))
}

/// Encode a UUID in its lowercase wire form.
pub fn encode(id: &Uuid) -> String {
    id.simple().to_string()
}

fn invalid(value: &str) -> FieldError {
    FieldError::InvalidUuid {
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_wire_form() {
        let id = Uuid::parse_str("0f8fad5b-d9cb-469f-a165-70867728950e").unwrap();
        assert_eq!(encode(&id), "0f8fad5bd9cb469fa16570867728950e");
        assert_eq!(
            from_wire("0f8fad5bd9cb469fa16570867728950e").unwrap(),
            "0f8fad5b-d9cb-469f-a165-70867728950e"
        );
        assert_eq!(decode("0F8FAD5BD9CB469FA16570867728950E", false), Ok(Some(id)));
    }

    #[test]
    fn test_wire_text_keeps_case() {
        let wire = "0F8FAD5BD9CB469FA16570867728950E";
        let dashed = from_wire(wire).unwrap();
        assert_eq!(dashed, "0F8FAD5B-D9CB-469F-A165-70867728950E");
        assert_eq!(to_wire(&dashed), wire);
    }

    #[test]
    fn test_rejects_malformed() {
        // The dashed form is not a wire form.
        assert!(from_wire("0f8fad5b-d9cb-469f-a165-70867728950e").is_err());
        assert!(from_wire("0f8fad5bd9cb469fa16570867728950").is_err());
        assert!(from_wire("zf8fad5bd9cb469fa16570867728950e").is_err());
        assert_eq!(decode("", true), Ok(None));
        assert_eq!(decode("", false), Err(FieldError::MissingValue));
    }

    proptest! {
        #[test]
        fn wire_text_roundtrip(wire in "[0-9a-fA-F]{32}") {
            prop_assert_eq!(to_wire(&from_wire(&wire).unwrap()), wire);
        }

        #[test]
        fn uuid_roundtrip(bytes in any::<[u8; 16]>(), upper in any::<bool>()) {
            let id = Uuid::from_bytes(bytes);
            let canonical = id.hyphenated().to_string();
            prop_assert_eq!(from_wire(&to_wire(&canonical)).unwrap(), canonical);

            let wire = encode(&id);
            prop_assert_eq!(wire.len(), 32);
            let wire = if upper { wire.to_uppercase() } else { wire };
            prop_assert_eq!(decode(&wire, false).unwrap(), Some(id));
        }
    }
}
