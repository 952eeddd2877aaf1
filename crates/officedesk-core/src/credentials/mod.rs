//! Credential list handling.
//!
//! This module provides:
//! - `CredentialEntry`/`CredentialList`: the in-memory (secret, identity) pairs
//! - `format`: the literal tuple-list syntax used on disk and in the editor
//! - `envelope`: passphrase-keyed chunked encryption of the plaintext form
//! - `CredentialStore`: full load/decrypt and full encrypt/save of the list
//!
//! The list is tiny (tens of entries), so there are no partial updates: it is
//! read whole at startup and replaced whole on save.

pub mod entry;
pub mod envelope;
pub mod format;
pub mod store;

pub use entry::{CredentialEntry, CredentialList, ROOT_IDENTITY};
pub use store::{CredentialStore, LoadOutcome, PassphraseProvider};
