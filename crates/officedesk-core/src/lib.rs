//! Core library for officedesk.
//!
//! This crate holds everything the front end needs to gate a small-office
//! record manager behind a password list:
//!
//! - `credentials`: the encrypted credential file and its tuple-list syntax
//! - `session`: current identity, inactivity auto-logout and menu gating
//! - `editor`: bulk text editing of the credential list
//! - `locale`: the two supported UI languages
//! - `config`: on-disk configuration with environment overrides
//!
//! The front end owns presentation; this crate never touches a terminal.

pub mod config;
pub mod credentials;
pub mod editor;
pub mod error;
pub mod locale;
pub mod notice;
pub mod session;

pub use config::{Config, PassphraseSource};
pub use credentials::{
    CredentialEntry, CredentialList, CredentialStore, LoadOutcome, PassphraseProvider,
};
pub use editor::CredentialEditor;
pub use error::{ConfigError, CredentialError, ValidationError};
pub use locale::Locale;
pub use notice::{Notice, NoticeLevel};
pub use session::{
    AuthOutcome, InactivityTimer, MenuController, MenuProjection, MenuSurface, QuitPolicy,
    SessionContext, SessionEvent, SessionState, Toggle,
};
