use officedesk_core::MenuSurface;

/// Menu state shown in the title bar. The session writes it, the renderer
/// reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuBar {
    pub login_label: String,
    pub restricted_enabled: bool,
    pub header: String,
}

impl MenuSurface for MenuBar {
    fn set_login_action_text(&mut self, text: &str) {
        self.login_label = text.to_string();
    }

    fn set_restricted_menu_enabled(&mut self, enabled: bool) {
        self.restricted_enabled = enabled;
    }

    fn set_header_text(&mut self, text: &str) {
        self.header = text.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use officedesk_core::{Locale, MenuController, SessionState};

    #[test]
    fn test_menu_bar_follows_session_state() {
        let controller = MenuController::new(Locale::En);
        let mut bar = MenuBar::default();

        controller.apply(&SessionState::for_identity("Root"), &mut bar);
        assert_eq!(bar.login_label, "Logout");
        assert!(bar.restricted_enabled);
        assert_eq!(bar.header, "Current user is: Root");

        controller.apply(&SessionState::Anonymous, &mut bar);
        assert_eq!(bar.login_label, "Login");
        assert!(!bar.restricted_enabled);
        assert_eq!(bar.header, "Current user is: Guest");
    }
}
