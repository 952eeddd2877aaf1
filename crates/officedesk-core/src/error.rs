use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Decryption backend unavailable: {0}")]
    DecryptionUnavailable(String),

    #[error("Credential file {} is missing or invalid: {reason}", path.display())]
    CorruptOrMissing { path: PathBuf, reason: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to write credential file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Rejections raised while turning editor text into a credential list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid password line {line}: {text}")]
    MalformedLine { line: usize, text: String },

    #[error("Missing essential 'Root' account")]
    MissingRootAccount,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unsupported locale '{0}' (expected 'es' or 'en')")]
    UnsupportedLocale(String),

    #[error("Could not find config directory")]
    NoConfigDir,

    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {name}: {value}")]
    InvalidOverride { name: &'static str, value: String },
}

impl CredentialError {
    /// True when the startup sequence must stop instead of falling back
    pub fn is_fatal(&self) -> bool {
        matches!(self, CredentialError::DecryptionUnavailable(_))
    }
}
