use std::time::Duration;

use super::state::SessionState;
use crate::locale::Locale;

/// The UI affordances the session layer drives, addressed by role.
pub trait MenuSurface {
    fn set_login_action_text(&mut self, text: &str);
    fn set_restricted_menu_enabled(&mut self, enabled: bool);
    fn set_header_text(&mut self, text: &str);
}

/// What the menu should look like for a given session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuProjection {
    pub login_label: &'static str,
    pub restricted_enabled: bool,
    pub header: String,
}

/// Pure projection from session state to menu enablement and header text.
#[derive(Debug, Clone, Copy)]
pub struct MenuController {
    locale: Locale,
}

impl MenuController {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn project(&self, state: &SessionState) -> MenuProjection {
        MenuProjection {
            login_label: if state.is_anonymous() { "Login" } else { "Logout" },
            restricted_enabled: state.is_root(),
            header: self.locale.current_user_header(state.identity()),
        }
    }

    pub fn apply<S: MenuSurface + ?Sized>(&self, state: &SessionState, surface: &mut S) {
        let projection = self.project(state);
        surface.set_login_action_text(projection.login_label);
        surface.set_restricted_menu_enabled(projection.restricted_enabled);
        surface.set_header_text(&projection.header);
    }

    /// Header shown right after a forced logout.
    pub fn apply_auto_logout<S: MenuSurface + ?Sized>(&self, after: Duration, surface: &mut S) {
        surface.set_header_text(&self.locale.auto_logout_header(after.as_secs()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        label: String,
        restricted: Option<bool>,
        header: String,
    }

    impl MenuSurface for Recorder {
        fn set_login_action_text(&mut self, text: &str) {
            self.label = text.to_string();
        }
        fn set_restricted_menu_enabled(&mut self, enabled: bool) {
            self.restricted = Some(enabled);
        }
        fn set_header_text(&mut self, text: &str) {
            self.header = text.to_string();
        }
    }

    #[test]
    fn test_project_guest() {
        let menu = MenuController::new(Locale::En);
        let projection = menu.project(&SessionState::Anonymous);
        assert_eq!(projection.login_label, "Login");
        assert!(!projection.restricted_enabled);
        assert_eq!(projection.header, "Current user is: Guest");
    }

    #[test]
    fn test_project_only_root_unlocks_restricted() {
        let menu = MenuController::new(Locale::En);
        for identity in ["Admin", "User", "root", "Root "] {
            let projection = menu.project(&SessionState::for_identity(identity));
            assert_eq!(projection.login_label, "Logout");
            assert!(!projection.restricted_enabled, "{} must not unlock", identity);
        }
        assert!(menu.project(&SessionState::for_identity("Root")).restricted_enabled);
    }

    #[test]
    fn test_apply_drives_surface() {
        let menu = MenuController::new(Locale::Es);
        let mut surface = Recorder::default();
        menu.apply(&SessionState::for_identity("Root"), &mut surface);
        assert_eq!(surface.label, "Logout");
        assert_eq!(surface.restricted, Some(true));
        assert_eq!(surface.header, "Usuario actual es: Root");

        menu.apply_auto_logout(Duration::from_secs(15), &mut surface);
        assert!(surface.header.contains("15 segundo"));
    }
}
