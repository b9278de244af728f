use std::path::PathBuf;

use medhx_codec::CodecError;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("no patient in the batch could be included in the load file")]
    NoPatients,

    #[error("invalid transmission id '{value}': {reason}")]
    InvalidTransmissionId { value: String, reason: &'static str },

    #[error("failed to generate random transmission id suffix: {message}")]
    Entropy { message: String },

    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sender configuration {origin}: {source}")]
    Config {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid sender configuration: {message}")]
    InvalidConfig { message: String },
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;
