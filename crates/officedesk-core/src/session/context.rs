use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use super::menu::{MenuController, MenuSurface};
use super::state::SessionState;
use super::timer::{InactivityTimer, SessionEvent};
use crate::credentials::{CredentialList, ROOT_IDENTITY};
use crate::locale::Locale;
use crate::notice::Notice;

/// Result of checking a password against the credential list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Accepted { identity: String },
    /// No entry matched; the session is now anonymous.
    Rejected,
}

/// What the login/logout toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// The session is anonymous; the front end should prompt for a password.
    PromptLogin,
    LoggedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitPolicy {
    Immediate,
    Confirm,
}

/// The one session of the running process.
///
/// Owns the credential list, the current state, the auto-logout timer and
/// the menu surface it keeps in sync. Every state change goes through
/// `transition`, which re-projects the menu and arms or cancels the timer.
pub struct SessionContext<S: MenuSurface> {
    credentials: CredentialList,
    state: SessionState,
    timer: InactivityTimer,
    menu: MenuController,
    surface: S,
    authenticated_at: Option<DateTime<Local>>,
}

impl<S: MenuSurface> SessionContext<S> {
    pub fn new(
        credentials: CredentialList,
        timer: InactivityTimer,
        menu: MenuController,
        mut surface: S,
    ) -> Self {
        let state = SessionState::Anonymous;
        menu.apply(&state, &mut surface);
        Self {
            credentials,
            state,
            timer,
            menu,
            surface,
            authenticated_at: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn identity(&self) -> &str {
        self.state.identity()
    }

    pub fn is_root(&self) -> bool {
        self.state.is_root()
    }

    pub fn credentials(&self) -> &CredentialList {
        &self.credentials
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn timer(&self) -> &InactivityTimer {
        &self.timer
    }

    pub fn locale(&self) -> Locale {
        self.menu.locale()
    }

    pub fn authenticated_at(&self) -> Option<DateTime<Local>> {
        self.authenticated_at
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = %self.state, to = %next, "Session transition");
        self.state = next;
        self.authenticated_at = if self.state.is_anonymous() {
            None
        } else {
            Some(Local::now())
        };

        self.menu.apply(&self.state, &mut self.surface);
        if self.state.is_anonymous() {
            self.timer.cancel();
        } else {
            self.timer.arm();
        }
    }

    /// Log in with the first entry whose secret matches. A miss leaves the
    /// session anonymous, whatever it was before.
    pub fn authenticate(&mut self, secret: &str) -> AuthOutcome {
        let matched = self.credentials.identity_for(secret).map(str::to_string);
        match matched {
            Some(identity) => {
                info!(identity = %identity, "Password accepted");
                self.transition(SessionState::for_identity(&identity));
                AuthOutcome::Accepted { identity }
            }
            None => {
                info!("Password rejected");
                self.transition(SessionState::Anonymous);
                AuthOutcome::Rejected
            }
        }
    }

    pub fn logout(&mut self) {
        info!(identity = %self.state, "Logout");
        self.transition(SessionState::Anonymous);
    }

    pub fn toggle(&mut self) -> Toggle {
        if self.state.is_anonymous() {
            Toggle::PromptLogin
        } else {
            self.logout();
            Toggle::LoggedOut
        }
    }

    /// Restart the inactivity countdown for an authenticated session.
    pub fn reset_inactivity(&mut self) {
        if !self.state.is_anonymous() {
            self.timer.arm();
        }
    }

    /// Apply an event posted to the UI loop. Returns the notice to show.
    pub fn handle_event(&mut self, event: SessionEvent) -> Option<Notice> {
        match event {
            SessionEvent::InactivityTimeout { generation, after } => {
                if !self.timer.take_fired(generation) {
                    debug!(generation, "Discarding stale auto-logout");
                    return None;
                }
                info!(identity = %self.state, seconds = after.as_secs(), "Auto-logout");
                self.transition(SessionState::Anonymous);
                self.menu.apply_auto_logout(after, &mut self.surface);

                let locale = self.locale();
                Some(Notice::warning(
                    locale.notification_title(),
                    locale.auto_logout_notice(after.as_secs()),
                ))
            }
        }
    }

    /// Install a newly saved list. An existing login stays valid even if
    /// its entry is gone.
    pub fn replace_credentials(&mut self, credentials: CredentialList) {
        debug!(entries = credentials.len(), "Credential list replaced");
        self.credentials = credentials;
    }

    /// Stop the countdown and report how quitting should proceed.
    pub fn quit(&mut self) -> QuitPolicy {
        self.timer.cancel();
        if self.state.is_root() {
            QuitPolicy::Immediate
        } else {
            QuitPolicy::Confirm
        }
    }

    /// Development shortcut: become Root without a password.
    pub fn force_root(&mut self) -> Notice {
        warn!("Dev Root shortcut used - disable dev_root_shortcut in production");
        self.transition(SessionState::for_identity(ROOT_IDENTITY));
        let locale = self.locale();
        Notice::warning(locale.warning_title(), locale.dev_root_shortcut())
    }

    /// Dialog shown after a login attempt.
    pub fn login_notice(&self, outcome: &AuthOutcome) -> Notice {
        let locale = self.locale();
        match outcome {
            AuthOutcome::Accepted { identity } => {
                Notice::info(locale.valid_password_title(), locale.password_accepted(identity))
            }
            AuthOutcome::Rejected => Notice::error(locale.error_title(), locale.password_invalid()),
        }
    }
}
