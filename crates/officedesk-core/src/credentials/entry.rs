use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::ValidationError;

/// Identity that unlocks the restricted menu. The list must always hold one.
pub const ROOT_IDENTITY: &str = "Root";

/// One usable password and the identity it logs in as.
///
/// Several entries may share an identity (group passwords). Both strings are
/// wiped from memory when the entry is dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct CredentialEntry {
    secret: String,
    identity: String,
}

impl CredentialEntry {
    pub fn new(secret: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            identity: identity.into(),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }
}

impl fmt::Debug for CredentialEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialEntry")
            .field("secret", &"<redacted>")
            .field("identity", &self.identity)
            .finish()
    }
}

/// Ordered credential entries. Order decides which entry wins when two
/// entries share a secret.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CredentialList {
    entries: Vec<CredentialEntry>,
}

impl CredentialList {
    pub fn new(entries: Vec<CredentialEntry>) -> Self {
        Self { entries }
    }

    /// Built-in fallback used when no valid encrypted file exists.
    pub fn defaults() -> Self {
        Self::new(vec![
            CredentialEntry::new("root", "Root"),
            CredentialEntry::new("admin", "Admin"),
            CredentialEntry::new("user", "User"),
        ])
    }

    pub fn entries(&self) -> &[CredentialEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: CredentialEntry) {
        self.entries.push(entry);
    }

    /// Identity of the first entry whose secret matches exactly.
    pub fn identity_for(&self, secret: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.secret == secret)
            .map(|e| e.identity.as_str())
    }

    pub fn has_root(&self) -> bool {
        self.entries.iter().any(|e| e.identity == ROOT_IDENTITY)
    }

    /// Reject a list that would lock everyone out of the restricted menu.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.has_root() {
            Ok(())
        } else {
            Err(ValidationError::MissingRootAccount)
        }
    }
}

impl FromIterator<CredentialEntry> for CredentialList {
    fn from_iter<I: IntoIterator<Item = CredentialEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CredentialList {
    type Item = &'a CredentialEntry;
    type IntoIter = std::slice::Iter<'a, CredentialEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
