//! Sender identity used on every outgoing file.
//!
//! Loaded from a TOML document:
//!
//! ```toml
//! sender_id = "ACME"
//! sender_password = "secret"
//! receiver_id = "S00000000000001"
//! usage = "test"
//! assigning_authority = "2.16.840.1.113883.3.9621"
//! file_prefix = "Medhx"
//! look_back_months = 12
//! ```

use std::fmt;
use std::path::Path;

use medhx_dialects::codes::Usage;
use serde::Deserialize;

use crate::error::{LoadError, Result};

/// Months of history requested when the configuration does not say.
pub const DEFAULT_LOOK_BACK_MONTHS: u32 = 12;

/// Which clearinghouse system the files are meant for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Test,
}

impl Environment {
    /// Usage indicator written on the load header.
    pub fn usage(self) -> Usage {
        match self {
            Self::Production => Usage::Production,
            Self::Test => Usage::Test,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SenderConfig {
    pub sender_id: String,
    pub sender_password: String,
    pub receiver_id: String,
    #[serde(default)]
    pub usage: Environment,
    /// OID of the organization issuing patient ids.
    pub assigning_authority: String,
    /// First component of every request file name.
    pub file_prefix: String,
    #[serde(default = "default_look_back_months")]
    pub look_back_months: u32,
}

fn default_look_back_months() -> u32 {
    DEFAULT_LOOK_BACK_MONTHS
}

impl SenderConfig {
    /// Parse and validate a configuration document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Self::parse(contents, "<inline>")
    }

    /// Read, parse and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        Self::parse(&contents, &path.display().to_string())
    }

    fn parse(contents: &str, origin: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| LoadError::Config {
            origin: origin.to_string(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("sender_id", &self.sender_id),
            ("receiver_id", &self.receiver_id),
            ("assigning_authority", &self.assigning_authority),
            ("file_prefix", &self.file_prefix),
        ] {
            if value.trim().is_empty() {
                return Err(LoadError::invalid_config(format!("{key} must not be empty")));
            }
        }
        if self.file_prefix.contains(['_', '/', '.']) {
            return Err(LoadError::invalid_config(
                "file_prefix must not contain '_', '/' or '.'",
            ));
        }
        if self.look_back_months == 0 {
            return Err(LoadError::invalid_config("look_back_months must be positive"));
        }
        Ok(())
    }
}

impl fmt::Debug for SenderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderConfig")
            .field("sender_id", &self.sender_id)
            .field("sender_password", &"***")
            .field("receiver_id", &self.receiver_id)
            .field("usage", &self.usage)
            .field("assigning_authority", &self.assigning_authority)
            .field("file_prefix", &self.file_prefix)
            .field("look_back_months", &self.look_back_months)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
sender_id = "ACME"
sender_password = "secret"
receiver_id = "S00000000000001"
usage = "production"
assigning_authority = "2.16.840.1.113883.3.9621"
file_prefix = "Medhx"
"#;

    #[test]
    fn test_parse_with_defaults() {
        let config = SenderConfig::from_toml_str(CONFIG).unwrap();
        assert_eq!(config.sender_id, "ACME");
        assert_eq!(config.usage.usage(), Usage::Production);
        assert_eq!(config.look_back_months, DEFAULT_LOOK_BACK_MONTHS);
    }

    #[test]
    fn test_usage_defaults_to_test() {
        let contents = CONFIG.replace("usage = \"production\"\n", "");
        let config = SenderConfig::from_toml_str(&contents).unwrap();
        assert_eq!(config.usage, Environment::Test);
    }

    #[test]
    fn test_rejects_unknown_usage() {
        let contents = CONFIG.replace("production", "staging");
        assert!(matches!(
            SenderConfig::from_toml_str(&contents),
            Err(LoadError::Config { .. })
        ));
    }

    #[test]
    fn test_validation() {
        let contents = CONFIG.replace("\"ACME\"", "\"  \"");
        let err = SenderConfig::from_toml_str(&contents).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid sender configuration: sender_id must not be empty"
        );

        let contents = format!("{CONFIG}look_back_months = 0\n");
        assert!(matches!(
            SenderConfig::from_toml_str(&contents),
            Err(LoadError::InvalidConfig { .. })
        ));

        let contents = CONFIG.replace("\"Medhx\"", "\"Med_hx\"");
        assert!(SenderConfig::from_toml_str(&contents).is_err());
    }

    #[test]
    fn test_debug_hides_password() {
        let config = SenderConfig::from_toml_str(CONFIG).unwrap();
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SenderConfig::load(Path::new("/nonexistent/medhx.toml")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
