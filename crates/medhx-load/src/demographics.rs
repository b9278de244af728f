//! Mapping domain demographics onto load-file fields.

use chrono::NaiveDate;
use medhx_dialects::codes::Gender;

const PREFIXES: &[&str] = &["mr", "mrs", "ms", "miss", "mx", "dr", "prof", "rev"];
const SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv", "v"];

/// Map a domain gender (`M`, `F`, `O`, `U`) to its wire code; anything else is unknown.
pub fn map_gender(domain: &str) -> Gender {
    match domain.trim() {
        "M" => Gender::Male,
        "F" => Gender::Female,
        "O" => Gender::NonBinary,
        _ => Gender::Unknown,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameParts {
    pub first: String,
    pub middle: Option<String>,
    pub last: String,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

/// Split domain names into load-file name components.
///
/// The first given name is the first name and any further given names form the
/// middle name. A leading honorific becomes the prefix and a trailing
/// generational marker on the family name becomes the suffix, as long as a name
/// remains once they are removed.
pub fn split_name(first_name: &str, last_name: &str) -> NameParts {
    let mut given: Vec<&str> = tokens(first_name);
    let mut family: Vec<&str> = tokens(last_name);

    let has_prefix = given.len() > 1 && given.first().is_some_and(|t| is_listed(t, PREFIXES));
    let prefix = has_prefix.then(|| given.remove(0));
    let has_suffix = family.len() > 1 && family.last().is_some_and(|t| is_listed(t, SUFFIXES));
    let suffix = if has_suffix { family.pop() } else { None };

    let mut given = given.into_iter();
    let first = given.next().unwrap_or_default().to_string();
    let middle = given.collect::<Vec<_>>().join(" ");

    NameParts {
        first,
        middle: (!middle.is_empty()).then_some(middle),
        last: family.join(" "),
        prefix: prefix.map(str::to_string),
        suffix: suffix.map(str::to_string),
    }
}

/// Parse a `CCYY-MM-DD` date of birth.
pub fn parse_date_of_birth(dob: &str) -> Option<NaiveDate> {
    let dob = dob.trim();
    if dob.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(dob, "%Y-%m-%d").ok()
}

/// Keep only the digits of a postal code.
pub fn normalize_zip(zip: &str) -> String {
    zip.chars().filter(char::is_ascii_digit).collect()
}

pub fn normalize_state(state: &str) -> String {
    state.trim().to_ascii_uppercase()
}

fn tokens(name: &str) -> Vec<&str> {
    name.split_whitespace()
        .map(|token| token.trim_end_matches(','))
        .filter(|token| !token.is_empty())
        .collect()
}

fn is_listed(token: &str, list: &[&str]) -> bool {
    let bare = token.trim_end_matches('.').to_ascii_lowercase();
    list.contains(&bare.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_mapping() {
        assert_eq!(map_gender("M"), Gender::Male);
        assert_eq!(map_gender("F"), Gender::Female);
        assert_eq!(map_gender("O"), Gender::NonBinary);
        assert_eq!(map_gender("U"), Gender::Unknown);
        assert_eq!(map_gender(""), Gender::Unknown);
        assert_eq!(map_gender("X"), Gender::Unknown);
    }

    #[test]
    fn test_simple_name() {
        assert_eq!(
            split_name("Ada", "Lovelace"),
            NameParts {
                first: "Ada".to_string(),
                last: "Lovelace".to_string(),
                ..NameParts::default()
            }
        );
    }

    #[test]
    fn test_middle_prefix_suffix() {
        let parts = split_name("Dr. Martin Luther", "King, Jr.");
        assert_eq!(parts.prefix.as_deref(), Some("Dr."));
        assert_eq!(parts.first, "Martin");
        assert_eq!(parts.middle.as_deref(), Some("Luther"));
        assert_eq!(parts.last, "King");
        assert_eq!(parts.suffix.as_deref(), Some("Jr."));
    }

    #[test]
    fn test_lone_honorific_is_a_name() {
        let parts = split_name("Miss", "V");
        assert_eq!(parts.first, "Miss");
        assert_eq!(parts.prefix, None);
        assert_eq!(parts.last, "V");
        assert_eq!(parts.suffix, None);
    }

    #[test]
    fn test_multi_word_family_name() {
        let parts = split_name("Vincent", "van Gogh III");
        assert_eq!(parts.last, "van Gogh");
        assert_eq!(parts.suffix.as_deref(), Some("III"));
    }

    #[test]
    fn test_date_of_birth() {
        assert_eq!(
            parse_date_of_birth("1815-12-10"),
            NaiveDate::from_ymd_opt(1815, 12, 10)
        );
        assert_eq!(parse_date_of_birth("18151210"), None);
        assert_eq!(parse_date_of_birth("1815-2-1"), None);
        assert_eq!(parse_date_of_birth("1815-02-30"), None);
    }

    #[test]
    fn test_address_normalization() {
        assert_eq!(normalize_zip("62701-1234"), "627011234");
        assert_eq!(normalize_state(" il "), "IL");
    }
}
