//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! UI language, auto-logout duration, credential file location and where
//! the credential file passphrase comes from.
//!
//! Configuration is stored at `~/.config/officedesk/config.json`. Selected
//! values can be overridden from the environment (or a `.env` file loaded by
//! the binary).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::locale::Locale;

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "officedesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Encrypted credential file name
const CREDENTIALS_FILE: &str = "passwords.txt.aes";

/// Five minutes of inactivity before an automatic logout.
const DEFAULT_AUTO_LOGOUT_SECONDS: u64 = 300;

const ENV_LOCALE: &str = "OFFICEDESK_LOCALE";
const ENV_AUTO_LOGOUT: &str = "OFFICEDESK_AUTO_LOGOUT_SECONDS";
const ENV_CREDENTIALS_FILE: &str = "OFFICEDESK_CREDENTIALS_FILE";

/// Where the credential file passphrase is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PassphraseSource {
    /// The fixed passphrase compiled into the binary.
    #[default]
    Builtin,
    /// A passphrase stored in the OS keychain.
    Keychain,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub locale: Option<String>,
    pub auto_logout_seconds: u64,
    pub credentials_file: Option<PathBuf>,
    pub passphrase_source: PassphraseSource,
    /// Allow Ctrl+R to become Root without a password. Development only.
    pub dev_root_shortcut: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: None,
            auto_logout_seconds: DEFAULT_AUTO_LOGOUT_SECONDS,
            credentials_file: None,
            passphrase_source: PassphraseSource::Builtin,
            dev_root_shortcut: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        let mut config = Self::load_from(&path)?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Read a config file, returning defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config = serde_json::from_str(&contents)?;
            debug!(path = %path.display(), "Config loaded");
            Ok(config)
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply environment overrides through `lookup` (the process environment
    /// in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(locale) = lookup(ENV_LOCALE) {
            self.locale = Some(locale);
        }
        if let Some(value) = lookup(ENV_AUTO_LOGOUT) {
            self.auto_logout_seconds =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidOverride {
                        name: ENV_AUTO_LOGOUT,
                        value,
                    })?;
        }
        if let Some(path) = lookup(ENV_CREDENTIALS_FILE) {
            self.credentials_file = Some(PathBuf::from(path));
        }
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Resolve the UI language: explicit setting first, then `LANG`.
    pub fn resolve_locale(&self, lang_env: Option<&str>) -> Result<Locale, ConfigError> {
        match self.locale.as_deref() {
            Some(code) => Locale::from_code(code),
            None => Locale::from_lang_env(lang_env),
        }
    }

    /// Inactivity timeout; zero disables auto-logout.
    pub fn auto_logout(&self) -> Duration {
        Duration::from_secs(self.auto_logout_seconds)
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join(APP_NAME))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.credentials_file
            .clone()
            .unwrap_or_else(|| Self::data_dir().join(CREDENTIALS_FILE))
    }
}
