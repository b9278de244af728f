//! Whole-number fields.

use crate::error::FieldError;

/// Decode an optionally signed run of digits; surrounding blanks are ignored.
pub fn decode(raw: &str, optional: bool) -> Result<Option<i64>, FieldError> {
    let value = raw.trim();
    if value.is_empty() {
        return if optional {
            Ok(None)
        } else {
            Err(FieldError::MissingValue)
        };
    }

    let digits = value.strip_prefix(['-', '+']).unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(raw));
    }
    value.parse().map(Some).map_err(|_| invalid(raw))
}

/// Encode without padding.
pub fn encode(value: i64) -> String {
    value.to_string()
}

fn invalid(value: &str) -> FieldError {
    FieldError::InvalidInteger {
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_decode() {
        assert_eq!(decode("42", false), Ok(Some(42)));
        assert_eq!(decode(" 7 ", false), Ok(Some(7)));
        assert_eq!(decode("-3", false), Ok(Some(-3)));
        assert_eq!(decode("", true), Ok(None));
        assert_eq!(decode("  ", false), Err(FieldError::MissingValue));
        assert!(decode("4.2", false).is_err());
        assert!(decode("1e3", false).is_err());
        assert!(decode("-", false).is_err());
        assert!(decode("99999999999999999999", false).is_err());
    }

    proptest! {
        #[test]
        fn integer_roundtrip(value in any::<i64>()) {
            prop_assert_eq!(decode(&encode(value), false).unwrap(), Some(value));
        }
    }
}
