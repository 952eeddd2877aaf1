use std::fmt;

use crate::credentials::ROOT_IDENTITY;

/// Identity of the anonymous session. It has no password.
pub const GUEST_IDENTITY: &str = "Guest";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(String),
}

impl SessionState {
    /// State for an identity taken from the credential list. An entry naming
    /// `Guest` still yields the anonymous state.
    pub fn for_identity(identity: &str) -> Self {
        if identity == GUEST_IDENTITY {
            SessionState::Anonymous
        } else {
            SessionState::Authenticated(identity.to_string())
        }
    }

    pub fn identity(&self) -> &str {
        match self {
            SessionState::Anonymous => GUEST_IDENTITY,
            SessionState::Authenticated(identity) => identity,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, SessionState::Anonymous)
    }

    /// Only the literal `Root` identity counts.
    pub fn is_root(&self) -> bool {
        matches!(self, SessionState::Authenticated(identity) if identity == ROOT_IDENTITY)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identity())
    }
}
