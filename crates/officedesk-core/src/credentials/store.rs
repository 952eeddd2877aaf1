use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use keyring::Entry;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::entry::CredentialList;
use super::envelope::{self, EnvelopeError};
use super::format;
use crate::config::PassphraseSource;
use crate::error::CredentialError;

/// Passphrase used when the operator has not moved it to the OS keychain.
/// Anyone with this source can decrypt the file; it only keeps the password
/// list out of casual view.
pub const BUILTIN_PASSPHRASE: &str = "root";

const KEYCHAIN_SERVICE: &str = "officedesk";
const KEYCHAIN_ACCOUNT: &str = "credential-file";

/// Result of the startup load.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(CredentialList),
    /// The file was absent or unreadable and the built-in list is active.
    Fallback {
        list: CredentialList,
        reason: CredentialError,
    },
}

impl LoadOutcome {
    pub fn list(&self) -> &CredentialList {
        match self {
            LoadOutcome::Loaded(list) => list,
            LoadOutcome::Fallback { list, .. } => list,
        }
    }

    pub fn into_list(self) -> CredentialList {
        match self {
            LoadOutcome::Loaded(list) => list,
            LoadOutcome::Fallback { list, .. } => list,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, LoadOutcome::Fallback { .. })
    }
}

/// Where the credential file passphrase comes from.
pub trait PassphraseProvider: Send + Sync {
    fn passphrase(&self) -> Result<Zeroizing<String>, CredentialError>;
}

impl PassphraseProvider for PassphraseSource {
    /// A keychain that cannot be reached or has no entry is
    /// `DecryptionUnavailable`.
    fn passphrase(&self) -> Result<Zeroizing<String>, CredentialError> {
        match self {
            PassphraseSource::Builtin => Ok(Zeroizing::new(BUILTIN_PASSPHRASE.to_string())),
            PassphraseSource::Keychain => {
                let entry = Entry::new(KEYCHAIN_SERVICE, KEYCHAIN_ACCOUNT).map_err(|e| {
                    CredentialError::DecryptionUnavailable(format!(
                        "Failed to create keyring entry: {}",
                        e
                    ))
                })?;
                entry.get_password().map(Zeroizing::new).map_err(|e| {
                    CredentialError::DecryptionUnavailable(format!(
                        "Failed to retrieve passphrase from keychain: {}",
                        e
                    ))
                })
            }
        }
    }
}

/// Reads and writes the encrypted credential file. Every call is a full
/// read/decrypt or a full encrypt/write; nothing is cached.
pub struct CredentialStore {
    path: PathBuf,
    provider: Box<dyn PassphraseProvider>,
}

impl CredentialStore {
    pub fn new(path: PathBuf, source: PassphraseSource) -> Self {
        Self::with_provider(path, source)
    }

    pub fn with_provider(path: PathBuf, provider: impl PassphraseProvider + 'static) -> Self {
        Self {
            path,
            provider: Box::new(provider),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn passphrase(&self) -> Result<Zeroizing<String>, CredentialError> {
        self.provider.passphrase()
    }

    /// Store the file passphrase in the OS keychain.
    pub fn store_keychain_passphrase(passphrase: &str) -> Result<(), CredentialError> {
        let entry = Entry::new(KEYCHAIN_SERVICE, KEYCHAIN_ACCOUNT).map_err(|e| {
            CredentialError::DecryptionUnavailable(format!("Failed to create keyring entry: {}", e))
        })?;
        entry.set_password(passphrase).map_err(|e| {
            CredentialError::DecryptionUnavailable(format!(
                "Failed to store passphrase in keychain: {}",
                e
            ))
        })
    }

    fn corrupt(&self, reason: impl Into<String>) -> CredentialError {
        CredentialError::CorruptOrMissing {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    /// Decrypt and parse the credential file.
    pub fn load(&self) -> Result<CredentialList, CredentialError> {
        let sealed = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(self.corrupt("not found")),
            Err(e) => return Err(self.corrupt(e.to_string())),
        };

        let passphrase = self.passphrase()?;
        let plaintext = envelope::open(&sealed, &passphrase).map_err(|e| match e {
            EnvelopeError::Backend(msg) => CredentialError::DecryptionUnavailable(msg),
            EnvelopeError::Invalid(msg) => self.corrupt(msg),
        })?;

        let text = std::str::from_utf8(&plaintext).map_err(|_| self.corrupt("not valid UTF-8"))?;
        let list = format::parse_list(text).map_err(|e| {
            self.corrupt(format!(
                "syntax error at byte {}: expected {}",
                e.offset, e.expected
            ))
        })?;

        debug!(path = %self.path.display(), entries = list.len(), "Credential file loaded");
        Ok(list)
    }

    /// Load the file, falling back to the built-in list when it is missing
    /// or invalid. Only an unusable decryption backend is returned as an error.
    pub fn load_or_default(&self) -> Result<LoadOutcome, CredentialError> {
        match self.load() {
            Ok(list) => Ok(LoadOutcome::Loaded(list)),
            Err(e) if e.is_fatal() => Err(e),
            Err(reason) => {
                warn!(
                    path = %self.path.display(),
                    error = %reason,
                    "Credential file unusable, default password list enabled"
                );
                Ok(LoadOutcome::Fallback {
                    list: CredentialList::defaults(),
                    reason,
                })
            }
        }
    }

    /// Encrypt the whole list and replace the file.
    ///
    /// The envelope goes to a sibling temp file first and is renamed into
    /// place, so readers only ever see the old or the new file.
    pub fn save(&self, list: &CredentialList) -> Result<(), CredentialError> {
        let passphrase = self.passphrase()?;
        let plaintext = format::format_list(list);
        let sealed = envelope::seal(plaintext.as_bytes(), &passphrase).map_err(|e| match e {
            EnvelopeError::Backend(msg) | EnvelopeError::Invalid(msg) => {
                CredentialError::DecryptionUnavailable(msg)
            }
        })?;

        let write_err = |source: std::io::Error| CredentialError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, &sealed).map_err(write_err)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(write_err(e));
        }

        info!(path = %self.path.display(), entries = list.len(), "Credential file saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialEntry;

    fn store_in(dir: &tempfile::TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("passwords.txt.aes"), PassphraseSource::Builtin)
    }

    /// A keychain that never answers.
    struct LockedKeychain;

    impl PassphraseProvider for LockedKeychain {
        fn passphrase(&self) -> Result<Zeroizing<String>, CredentialError> {
            Err(CredentialError::DecryptionUnavailable(
                "keychain locked".to_string(),
            ))
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let list = CredentialList::new(vec![
            CredentialEntry::new("s3cret", "Root"),
            CredentialEntry::new("front desk", "User"),
        ]);

        store.save(&list).unwrap();
        assert_eq!(store.load().unwrap(), list);
    }

    #[test]
    fn test_saved_file_is_not_plaintext() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&CredentialList::defaults()).unwrap();

        let raw = fs::read(store.path()).unwrap();
        assert!(!raw.windows(5).any(|w| w == b"admin"));
        // no plaintext or temp file is left behind
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("passwords.txt.aes")]);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("passwords.txt.aes");
        let store = CredentialStore::new(path.clone(), PassphraseSource::Builtin);
        store.save(&CredentialList::defaults()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_load_missing_is_corrupt_or_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = store_in(&dir).load().unwrap_err();
        assert!(matches!(err, CredentialError::CorruptOrMissing { ref reason, .. } if reason == "not found"));
    }

    #[test]
    fn test_load_garbage_is_corrupt_or_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), b"definitely not an envelope").unwrap();
        assert!(matches!(
            store.load(),
            Err(CredentialError::CorruptOrMissing { .. })
        ));
    }

    #[test]
    fn test_load_rejects_unparseable_plaintext() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let sealed = envelope::seal(b"print('hello')", BUILTIN_PASSPHRASE).unwrap();
        fs::write(store.path(), sealed).unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, CredentialError::CorruptOrMissing { ref reason, .. } if reason.contains("syntax error")));
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = store_in(&dir).load_or_default().unwrap();
        assert!(outcome.is_fallback());
        assert_eq!(outcome.list(), &CredentialList::defaults());
    }

    #[test]
    fn test_load_or_default_uses_file_when_valid() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let list = CredentialList::new(vec![CredentialEntry::new("x", "Root")]);
        store.save(&list).unwrap();

        let outcome = store.load_or_default().unwrap();
        assert!(!outcome.is_fallback());
        assert_eq!(outcome.into_list(), list);
    }

    #[test]
    fn test_save_does_not_judge_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let no_root = CredentialList::new(vec![CredentialEntry::new("a", "Admin")]);
        store.save(&no_root).unwrap();
        assert_eq!(store.load().unwrap(), no_root);
    }

    #[test]
    fn test_load_or_default_propagates_unavailable_passphrase() {
        let dir = tempfile::tempdir().unwrap();
        store_in(&dir).save(&CredentialList::defaults()).unwrap();

        let locked = CredentialStore::with_provider(dir.path().join("passwords.txt.aes"), LockedKeychain);
        let err = locked.load_or_default().unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, CredentialError::DecryptionUnavailable(ref m) if m == "keychain locked"));
    }

    #[test]
    fn test_save_with_unavailable_passphrase_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passwords.txt.aes");
        let locked = CredentialStore::with_provider(path.clone(), LockedKeychain);
        assert!(locked.save(&CredentialList::defaults()).unwrap_err().is_fatal());
        assert!(!path.exists());
    }
}
