//! Free-text fields.

use crate::error::FieldError;
use crate::{DELIMITER, ESCAPED_DELIMITER};

/// Length and optionality rules of a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextFormat {
    /// Blank decodes to `None`, `None` encodes to blank.
    pub optional: bool,
    /// Minimum length of a required outgoing value.
    pub min_length: Option<usize>,
    /// Maximum length of an outgoing value.
    pub max_length: Option<usize>,
    /// Cut over-long outgoing values instead of failing.
    pub truncate: bool,
}

impl TextFormat {
    pub const fn required() -> Self {
        Self {
            optional: false,
            min_length: None,
            max_length: None,
            truncate: false,
        }
    }

    pub const fn optional() -> Self {
        Self {
            optional: true,
            min_length: None,
            max_length: None,
            truncate: false,
        }
    }

    #[must_use]
    pub const fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    #[must_use]
    pub const fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    #[must_use]
    pub const fn truncate(mut self) -> Self {
        self.truncate = true;
        self
    }
}

/// Replace every `|` with the `\F\` escape.
pub fn escape(value: &str) -> String {
    value.replace(DELIMITER, ESCAPED_DELIMITER)
}

/// Replace every `\F\` escape with `|`.
pub fn unescape(value: &str) -> String {
    value.replace(ESCAPED_DELIMITER, "|")
}

/// Unescape and trim; a blank optional field is `None`.
pub fn decode(raw: &str, format: &TextFormat) -> Option<String> {
    let value = unescape(raw).trim().to_string();
    if format.optional && value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Escape, then apply length rules to the escaped column.
///
/// The maximum bounds the column as written. Truncation drops whole characters,
/// so an escape sequence is never cut in half.
pub fn encode(value: Option<&str>, format: &TextFormat) -> Result<String, FieldError> {
    let Some(value) = value else {
        return if format.optional {
            Ok(String::new())
        } else {
            Err(FieldError::MissingValue)
        };
    };

    let length = value.chars().count();
    if let Some(min) = format.min_length
        && !format.optional
        && length < min
    {
        return Err(FieldError::TooShort { length, min });
    }

    let escaped = escape(value);
    let wire_length = escaped.chars().count();
    match format.max_length {
        Some(max) if wire_length > max && format.truncate => Ok(truncate_escaped(value, max)),
        Some(max) if wire_length > max => Err(FieldError::TooLong {
            length: wire_length,
            max,
        }),
        _ => Ok(escaped),
    }
}

fn truncate_escaped(value: &str, max: usize) -> String {
    let mut out = String::with_capacity(max);
    let mut used = 0;
    for ch in value.chars() {
        let width = if ch == DELIMITER {
            ESCAPED_DELIMITER.chars().count()
        } else {
            1
        };
        if used + width > max {
            break;
        }
        if ch == DELIMITER {
            out.push_str(ESCAPED_DELIMITER);
        } else {
            out.push(ch);
        }
        used += width;
    }
    out
}
