//! Code-list (enumerated) fields.

use crate::error::FieldError;

/// Accept a member of `values`; blank is `None` when optional.
pub fn decode(
    raw: &str,
    values: &'static [&'static str],
    optional: bool,
) -> Result<Option<&'static str>, FieldError> {
    if let Some(code) = values.iter().find(|code| **code == raw) {
        return Ok(Some(*code));
    }
    if raw.is_empty() && optional {
        return Ok(None);
    }
    Err(invalid(raw, values))
}

/// Emit a member of `values`; `None` is blank when optional.
pub fn encode(
    value: Option<&str>,
    values: &'static [&'static str],
    optional: bool,
) -> Result<String, FieldError> {
    match value {
        Some(code) if values.iter().any(|candidate| *candidate == code) => Ok(code.to_string()),
        None if optional => Ok(String::new()),
        None => Err(FieldError::MissingValue),
        Some(code) => Err(invalid(code, values)),
    }
}

fn invalid(value: &str, values: &[&str]) -> FieldError {
    FieldError::InvalidCode {
        value: value.to_string(),
        allowed: values.join(","),
    }
}
