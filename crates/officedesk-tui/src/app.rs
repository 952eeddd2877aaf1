//! Application state management for officedesk.
//!
//! This module contains the `App` struct that owns the session context, the
//! credential store, the open password editor and all UI state. Timer
//! events reach it through an MPSC channel that the main loop drains.

use std::collections::VecDeque;

use tokio::sync::mpsc;
use tracing::{debug, info};

use officedesk_core::{
    AuthOutcome, Config, CredentialEditor, CredentialStore, InactivityTimer, LoadOutcome, Locale,
    MenuController, Notice, QuitPolicy, SessionContext, SessionEvent, Toggle,
};

use crate::ui::menu_bar::MenuBar;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the session event channel.
/// Only one timer is live at a time, so a handful of slots is plenty.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// UI State Types
// ============================================================================

/// Main content area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    PasswordEditor,
}

/// Action waiting on a yes/no answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Quit,
    RestoreDefaults,
    DiscardEdits,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    LoggingIn,
    Confirming(ConfirmAction),
    Quitting,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub config: Config,
    pub locale: Locale,
    pub store: CredentialStore,
    pub session: SessionContext<MenuBar>,

    // UI State
    pub state: AppState,
    pub screen: Screen,
    pub status_message: Option<String>,

    // Login form state
    pub login_password: String,
    pub login_error: Option<String>,

    pub editor: Option<CredentialEditor>,

    /// Modal notices, oldest first
    pub notices: VecDeque<Notice>,

    events_rx: mpsc::Receiver<SessionEvent>,
}

impl App {
    /// Create the application around an already loaded credential list.
    pub fn new(config: Config, locale: Locale, store: CredentialStore, loaded: LoadOutcome) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let timer = InactivityTimer::new(config.auto_logout(), tx);

        let mut notices = VecDeque::new();
        let credentials = match loaded {
            LoadOutcome::Loaded(list) => list,
            LoadOutcome::Fallback { list, reason } => {
                notices.push_back(Notice::warning(
                    locale.warning_title(),
                    locale.fallback_warning(&reason.to_string()),
                ));
                list
            }
        };
        debug!(entries = credentials.len(), "Credential list ready");

        let session = SessionContext::new(
            credentials,
            timer,
            MenuController::new(locale),
            MenuBar::default(),
        );

        Self {
            config,
            locale,
            store,
            session,
            state: AppState::Normal,
            screen: Screen::Home,
            status_message: None,
            login_password: String::new(),
            login_error: None,
            editor: None,
            notices,
            events_rx: rx,
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_password.clear();
        self.login_error = None;
    }

    pub fn cancel_login(&mut self) {
        self.login_password.clear();
        self.login_error = None;
        self.state = AppState::Normal;
    }

    /// Login/logout menu action
    pub fn toggle_login(&mut self) {
        match self.session.toggle() {
            Toggle::PromptLogin => self.start_login(),
            Toggle::LoggedOut => {
                self.close_restricted_screens();
                self.status_message = None;
            }
        }
    }

    /// Check the password typed in the login overlay.
    pub fn attempt_login(&mut self) {
        let outcome = self.session.authenticate(&self.login_password);
        self.login_password.clear();

        match outcome {
            AuthOutcome::Accepted { .. } => {
                let notice = self.session.login_notice(&outcome);
                self.notices.push_back(notice);
                self.login_error = None;
                self.state = AppState::Normal;
            }
            AuthOutcome::Rejected => {
                self.login_error = Some(self.locale.password_invalid().to_string());
                self.close_restricted_screens();
            }
        }
    }

    pub fn dev_root_shortcut(&mut self) {
        if !self.config.dev_root_shortcut {
            return;
        }
        let notice = self.session.force_root();
        self.notices.push_back(notice);
    }

    // =========================================================================
    // Password editor
    // =========================================================================

    /// Open the editor from the Root menu. Ignored for everyone else.
    pub fn open_password_editor(&mut self) {
        if !self.session.surface().restricted_enabled {
            self.status_message = Some(self.locale.root_menu_required().to_string());
            return;
        }
        self.editor = Some(CredentialEditor::open(self.session.credentials()));
        self.screen = Screen::PasswordEditor;
        self.status_message = None;
    }

    pub fn close_password_editor(&mut self) {
        self.editor = None;
        self.screen = Screen::Home;
    }

    /// Leave the editor, asking first when there are unsaved edits.
    pub fn request_close_password_editor(&mut self) {
        match self.editor.as_ref() {
            Some(editor) if editor.is_dirty() => {
                self.state = AppState::Confirming(ConfirmAction::DiscardEdits);
            }
            _ => self.close_password_editor(),
        }
    }

    fn close_restricted_screens(&mut self) {
        if !self.session.is_root() && self.screen == Screen::PasswordEditor {
            info!("Password editor closed, Root no longer logged in");
            self.close_password_editor();
        }
    }

    pub fn save_password_editor(&mut self) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        let result = editor.save(&self.store, &mut self.session);
        self.notices
            .push_back(CredentialEditor::save_notice(&result, self.locale));
        if result.is_ok() {
            self.close_password_editor();
        }
    }

    pub fn show_editor_about(&mut self) {
        self.notices.push_back(Notice::info(
            self.locale.editor_title(),
            self.locale.editor_about(),
        ));
    }

    // =========================================================================
    // Confirmation dialogs
    // =========================================================================

    pub fn request_restore_defaults(&mut self) {
        if self.editor.is_some() {
            self.state = AppState::Confirming(ConfirmAction::RestoreDefaults);
        }
    }

    pub fn request_quit(&mut self) {
        match self.session.quit() {
            QuitPolicy::Immediate => self.state = AppState::Quitting,
            QuitPolicy::Confirm => {
                self.state = AppState::Confirming(ConfirmAction::Quit);
            }
        }
    }

    /// Apply the answer to the pending confirmation.
    pub fn resolve_confirm(&mut self, confirmed: bool) {
        let AppState::Confirming(action) = self.state else {
            return;
        };
        self.state = AppState::Normal;

        match action {
            ConfirmAction::Quit => {
                if confirmed {
                    self.state = AppState::Quitting;
                } else {
                    // quitting stopped the countdown; staying resumes it
                    self.session.reset_inactivity();
                }
            }
            ConfirmAction::RestoreDefaults => {
                if let Some(editor) = self.editor.as_mut() {
                    let notice = editor.restore_defaults(confirmed, self.locale);
                    self.notices.push_back(notice);
                }
            }
            ConfirmAction::DiscardEdits => {
                if confirmed {
                    self.close_password_editor();
                }
            }
        }
    }

    pub fn confirm_prompt(&self, action: ConfirmAction) -> &'static str {
        match action {
            ConfirmAction::Quit => self.locale.quit_prompt(),
            ConfirmAction::RestoreDefaults => self.locale.restore_defaults_prompt(),
            ConfirmAction::DiscardEdits => self.locale.discard_edits_prompt(),
        }
    }

    // =========================================================================
    // Notices
    // =========================================================================

    pub fn current_notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    pub fn dismiss_notice(&mut self) {
        self.notices.pop_front();
    }

    // =========================================================================
    // Session events
    // =========================================================================

    /// Apply timer events posted since the last frame.
    pub fn check_session_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            if let Some(notice) = self.session.handle_event(event) {
                self.close_restricted_screens();
                if self.state == AppState::LoggingIn {
                    self.cancel_login();
                }
                self.notices.push_back(notice);
            }
        }
    }

    /// Status bar text: who is logged in, since when, and when the
    /// auto-logout will fire.
    pub fn session_status(&self) -> String {
        let Some(since) = self.session.authenticated_at() else {
            return format!("{} ({})", self.session.identity(), self.locale);
        };
        let mut status = self.locale.session_since(
            self.session.identity(),
            &since.format("%H:%M:%S").to_string(),
        );
        if let Some(remaining) = self.session.timer().remaining() {
            status.push_str(" | ");
            status.push_str(&self.locale.auto_logout_countdown(remaining.as_secs()));
        }
        status
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a password character should be accepted.
/// `current_len` is counted in chars, not bytes.
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use officedesk_core::{CredentialError, CredentialList, NoticeLevel, PassphraseSource};

    fn app_in(dir: &tempfile::TempDir, seconds: u64) -> App {
        let config = Config {
            auto_logout_seconds: seconds,
            ..Config::default()
        };
        let store = CredentialStore::new(dir.path().join("passwords.txt.aes"), PassphraseSource::Builtin);
        App::new(
            config,
            Locale::En,
            store,
            LoadOutcome::Loaded(CredentialList::defaults()),
        )
    }

    fn login(app: &mut App, password: &str) {
        app.start_login();
        app.login_password = password.to_string();
        app.attempt_login();
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(MAX_PASSWORD_LENGTH - 1, 'z'));
        assert!(!can_add_password_char(MAX_PASSWORD_LENGTH, 'a'));
        assert!(!can_add_password_char(0, '\n'));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_shows_warning() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("x.aes"), PassphraseSource::Builtin);
        let app = App::new(
            Config::default(),
            Locale::En,
            store,
            LoadOutcome::Fallback {
                list: CredentialList::defaults(),
                reason: CredentialError::CorruptOrMissing {
                    path: dir.path().join("x.aes"),
                    reason: "not found".to_string(),
                },
            },
        );
        let notice = app.current_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(notice.message.contains("default password list"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_success_closes_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, 15);
        login(&mut app, "root");

        assert_eq!(app.state, AppState::Normal);
        assert!(app.login_password.is_empty());
        assert!(app.session.surface().restricted_enabled);
        assert!(app.current_notice().unwrap().message.contains("ACCEPTED for Root"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_failure_stays_inline() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, 15);
        login(&mut app, "wrong");

        assert_eq!(app.state, AppState::LoggingIn);
        assert!(app.login_error.as_deref().unwrap().contains("INVALID"));
        assert!(app.session.state().is_anonymous());
    }

    #[tokio::test(start_paused = true)]
    async fn test_editor_is_root_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, 15);
        login(&mut app, "admin");
        app.open_password_editor();
        assert_eq!(app.screen, Screen::Home);
        assert!(app.editor.is_none());

        app.toggle_login();
        login(&mut app, "root");
        app.open_password_editor();
        assert_eq!(app.screen, Screen::PasswordEditor);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_logout_closes_editor() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, 15);
        login(&mut app, "root");
        app.dismiss_notice();
        app.open_password_editor();

        tokio::time::sleep(Duration::from_secs(16)).await;
        app.check_session_events();

        assert!(app.session.state().is_anonymous());
        assert_eq!(app.screen, Screen::Home);
        assert!(app.current_notice().unwrap().message.contains("15 seconds"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_confirm_and_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, 15);
        login(&mut app, "admin");

        app.request_quit();
        assert_eq!(app.state, AppState::Confirming(ConfirmAction::Quit));
        assert!(!app.session.timer().is_armed());

        app.resolve_confirm(false);
        assert_eq!(app.state, AppState::Normal);
        assert!(app.session.timer().is_armed());

        app.request_quit();
        app.resolve_confirm(true);
        assert_eq!(app.state, AppState::Quitting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_root_quits_without_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, 15);
        login(&mut app, "root");
        app.request_quit();
        assert_eq!(app.state, AppState::Quitting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_defaults_then_save() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, 15);
        login(&mut app, "root");
        app.open_password_editor();
        if let Some(editor) = app.editor.as_mut() {
            editor.set_buffer("('only', 'Admin')\n");
        }

        app.save_password_editor();
        assert_eq!(app.screen, Screen::PasswordEditor);
        assert_eq!(app.notices.back().unwrap().level, NoticeLevel::Warning);

        app.request_restore_defaults();
        app.resolve_confirm(true);
        app.save_password_editor();
        assert_eq!(app.screen, Screen::Home);
        assert!(app.store.path().exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dev_shortcut_disabled_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, 15);
        app.dev_root_shortcut();
        assert!(app.session.state().is_anonymous());

        app.config.dev_root_shortcut = true;
        app.dev_root_shortcut();
        assert!(app.session.is_root());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dirty_editor_asks_before_discarding() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, 15);
        login(&mut app, "root");
        app.open_password_editor();

        app.request_close_password_editor();
        assert_eq!(app.screen, Screen::Home);

        app.open_password_editor();
        if let Some(editor) = app.editor.as_mut() {
            editor.insert_char('#');
        }
        app.request_close_password_editor();
        assert_eq!(app.state, AppState::Confirming(ConfirmAction::DiscardEdits));
        app.resolve_confirm(false);
        assert_eq!(app.screen, Screen::PasswordEditor);
        assert!(app.editor.as_ref().unwrap().is_dirty());

        app.request_close_password_editor();
        app.resolve_confirm(true);
        assert_eq!(app.screen, Screen::Home);
        assert!(app.editor.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spanish_strings() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("p.aes"), PassphraseSource::Builtin);
        let mut app = App::new(
            Config::default(),
            Locale::Es,
            store,
            LoadOutcome::Loaded(CredentialList::defaults()),
        );
        login(&mut app, "admin");
        app.dismiss_notice();
        app.open_password_editor();
        assert_eq!(app.status_message.as_deref(), Some("El menú Root requiere el usuario Root"));
        assert!(app.session_status().starts_with("Admin desde "));
        assert!(app.session_status().contains("auto-logout en"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_status() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, 15);
        assert_eq!(app.session_status(), "Guest (en)");
        login(&mut app, "user");
        let status = app.session_status();
        assert!(status.starts_with("User since "));
        assert!(status.contains("auto-logout in"));
    }
}
