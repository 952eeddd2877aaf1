//! Test doubles shared by the session and editor tests.

use std::time::Duration;

use tokio::sync::mpsc;

use super::{InactivityTimer, MenuController, MenuSurface, SessionContext, SessionEvent};
use crate::credentials::CredentialList;
use crate::locale::Locale;

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub label: String,
    pub restricted: bool,
    pub header: String,
}

impl MenuSurface for RecordingSurface {
    fn set_login_action_text(&mut self, text: &str) {
        self.label = text.to_string();
    }

    fn set_restricted_menu_enabled(&mut self, enabled: bool) {
        self.restricted = enabled;
    }

    fn set_header_text(&mut self, text: &str) {
        self.header = text.to_string();
    }
}

pub fn context_with(
    credentials: CredentialList,
    seconds: u64,
) -> (SessionContext<RecordingSurface>, mpsc::Receiver<SessionEvent>) {
    let (tx, rx) = mpsc::channel(8);
    let timer = InactivityTimer::new(Duration::from_secs(seconds), tx);
    let ctx = SessionContext::new(
        credentials,
        timer,
        MenuController::new(Locale::En),
        RecordingSurface::default(),
    );
    (ctx, rx)
}

pub fn context(seconds: u64) -> (SessionContext<RecordingSurface>, mpsc::Receiver<SessionEvent>) {
    context_with(CredentialList::defaults(), seconds)
}
