//! UI language selection and the localized strings the session layer emits.
//!
//! Exactly two languages are recognized. Anything else is a startup fault,
//! never a silent fallback.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Es,
    En,
}

impl Locale {
    /// Look up a two-letter code.
    pub fn from_code(code: &str) -> Result<Self, ConfigError> {
        match code {
            "es" => Ok(Locale::Es),
            "en" => Ok(Locale::En),
            other => Err(ConfigError::UnsupportedLocale(other.to_string())),
        }
    }

    /// Derive the locale from a `LANG`-style value such as `es_MX.UTF-8`.
    ///
    /// An absent value, or the `C`/`POSIX` pseudo-locales, mean no language
    /// was chosen and resolve to English. Any real language other than the
    /// two supported ones is rejected.
    pub fn from_lang_env(lang: Option<&str>) -> Result<Self, ConfigError> {
        let lang = match lang.map(str::trim) {
            None | Some("") | Some("C") | Some("POSIX") => return Ok(Locale::En),
            Some(l) if l.starts_with("C.") => return Ok(Locale::En),
            Some(l) => l,
        };
        let prefix: String = lang.chars().take(2).collect();
        Self::from_code(&prefix.to_ascii_lowercase())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Locale::Es => "es",
            Locale::En => "en",
        }
    }

    pub fn current_user_header(&self, identity: &str) -> String {
        match self {
            Locale::Es => format!("Usuario actual es: {}", identity),
            Locale::En => format!("Current user is: {}", identity),
        }
    }

    pub fn auto_logout_header(&self, seconds: u64) -> String {
        match self {
            Locale::Es => format!(
                "Usuario actual:  Guest  - despues de auto-logout por {} segundo 'timeout'",
                seconds
            ),
            Locale::En => format!(
                "Current user:  Guest  - after timed {} second auto-logout event",
                seconds
            ),
        }
    }

    pub fn auto_logout_notice(&self, seconds: u64) -> String {
        match self {
            Locale::Es => format!("Sesión cerrada tras {} segundos de inactividad", seconds),
            Locale::En => format!("Logged out after {} seconds of inactivity", seconds),
        }
    }

    pub fn password_accepted(&self, identity: &str) -> String {
        match self {
            Locale::Es => format!("Contraseña ACEPTADA para {}", identity),
            Locale::En => format!("Password ACCEPTED for {}", identity),
        }
    }

    pub fn password_invalid(&self) -> &'static str {
        match self {
            Locale::Es => "Contraseña - INVALIDA      Usuario actual ahora es \"Guest\"",
            Locale::En => "Password - INVALID      Current user now set to \"Guest\"",
        }
    }

    pub fn quit_prompt(&self) -> &'static str {
        match self {
            Locale::Es => "Realmente Salir?",
            Locale::En => "Really quit?",
        }
    }

    pub fn restore_defaults_prompt(&self) -> &'static str {
        match self {
            Locale::Es => "Realmente restaurar valores por defecto?",
            Locale::En => "Really restore defaults?",
        }
    }

    pub fn defaults_restored(&self) -> &'static str {
        match self {
            Locale::Es => "Valores por defecto restaurados",
            Locale::En => "Defaults restored",
        }
    }

    pub fn restore_canceled(&self) -> &'static str {
        match self {
            Locale::Es => "Restauración cancelada",
            Locale::En => "Restore canceled",
        }
    }

    pub fn password_list_saved(&self) -> &'static str {
        match self {
            Locale::Es => "Lista de contraseñas actualizada y guardada en el archivo cifrado",
            Locale::En => {
                "Updated password list now available - and has been saved to the encrypted passwords file"
            }
        }
    }

    pub fn fallback_warning(&self, reason: &str) -> String {
        match self {
            Locale::Es => format!(
                "Archivo de contraseñas cifrado no encontrado o invalido ({}). \
                 La lista por defecto está activa, con la contraseña de Root 'root'. \
                 Cree y guarde una nueva lista desde el menú Root.",
                reason
            ),
            Locale::En => format!(
                "Encrypted password file was not found or is invalid ({}). \
                 The default password list is now enabled, with the Root password set to 'root'. \
                 (Re)create a new password list under the Root menu and save it.",
                reason
            ),
        }
    }

    pub fn dev_root_shortcut(&self) -> &'static str {
        match self {
            Locale::Es => "Modo desarrollo - usuario actual es Root",
            Locale::En => "Dev mode - current user set to Root",
        }
    }

    pub fn validation_message(&self, error: &ValidationError) -> String {
        match (self, error) {
            (Locale::Es, ValidationError::MalformedLine { line, text }) => {
                format!("Línea de contraseña {} invalida: {}", line, text)
            }
            (Locale::Es, ValidationError::MissingRootAccount) => {
                "Falta la cuenta esencial 'Root'".to_string()
            }
            (Locale::En, e) => e.to_string(),
        }
    }

    pub fn save_failed(&self, detail: &str) -> String {
        match self {
            Locale::Es => format!("La lista de contraseñas no se guardó: {}", detail),
            Locale::En => format!("Password list not saved: {}", detail),
        }
    }

    pub fn root_menu_required(&self) -> &'static str {
        match self {
            Locale::Es => "El menú Root requiere el usuario Root",
            Locale::En => "Root menu requires the Root user",
        }
    }

    pub fn discard_edits_prompt(&self) -> &'static str {
        match self {
            Locale::Es => "Descartar cambios sin guardar?",
            Locale::En => "Discard unsaved changes?",
        }
    }

    pub fn editor_title(&self) -> &'static str {
        match self {
            Locale::Es => "Editar Lista de Contraseñas",
            Locale::En => "Edit Passwords List",
        }
    }

    pub fn editor_about(&self) -> &'static str {
        match self {
            Locale::Es => {
                "Cada línea es una tupla como ('contraseña', 'nombre_usuario'). \
                 Las líneas que empiezan con # y las líneas vacías se ignoran. \
                 El usuario Root es necesario para el menú Root - no lo renombre \
                 ni lo borre, pero sí cambie su contraseña. Al guardar se revisa \
                 la lista, se cifra en el archivo de contraseñas y pasa a ser la \
                 lista activa."
            }
            Locale::En => {
                "Each line is a tuple like ('password', 'user_name'). \
                 Lines starting with # and blank lines are ignored. \
                 The Root user name is required for the Root menu to work - \
                 do not rename or delete it, but do change its password. \
                 Saving checks the list, encrypts it to the passwords file \
                 and makes it the active list."
            }
        }
    }

    pub fn logged_in_as(&self, identity: &str) -> String {
        match self {
            Locale::Es => format!("Sesión iniciada como {}", identity),
            Locale::En => format!("Logged in as {}", identity),
        }
    }

    pub fn login_hint(&self) -> &'static str {
        match self {
            Locale::Es => "para iniciar sesión",
            Locale::En => "to log in",
        }
    }

    pub fn edit_list_hint(&self) -> &'static str {
        match self {
            Locale::Es => "para editar la lista de contraseñas",
            Locale::En => "to edit the passwords list",
        }
    }

    pub fn auto_logout_policy(&self, seconds: u64) -> String {
        match (self, seconds) {
            (Locale::Es, 0) => "Auto-logout desactivado".to_string(),
            (Locale::En, 0) => "Auto-logout disabled".to_string(),
            (Locale::Es, s) => format!("Auto-logout tras {}s de inactividad", s),
            (Locale::En, s) => format!("Auto-logout after {}s of inactivity", s),
        }
    }

    /// Status bar text for an authenticated session.
    pub fn session_since(&self, identity: &str, since: &str) -> String {
        match self {
            Locale::Es => format!("{} desde {}", identity, since),
            Locale::En => format!("{} since {}", identity, since),
        }
    }

    pub fn auto_logout_countdown(&self, seconds: u64) -> String {
        match self {
            Locale::Es => format!("auto-logout en {}s", seconds),
            Locale::En => format!("auto-logout in {}s", seconds),
        }
    }

    pub fn password_label(&self) -> &'static str {
        match self {
            Locale::Es => "Contraseña",
            Locale::En => "Password",
        }
    }

    pub fn accept_label(&self) -> &'static str {
        match self {
            Locale::Es => "aceptar",
            Locale::En => "accept",
        }
    }

    pub fn cancel_label(&self) -> &'static str {
        match self {
            Locale::Es => "cancelar",
            Locale::En => "cancel",
        }
    }

    pub fn help_label(&self) -> &'static str {
        match self {
            Locale::Es => "Ayuda",
            Locale::En => "Help",
        }
    }

    /// Key bindings of the help overlay, as (key, description) pairs.
    pub fn help_session_keys(&self) -> [(&'static str, &'static str); 2] {
        match self {
            Locale::Es => [("l", "Iniciar / cerrar sesión"), ("q", "Salir")],
            Locale::En => [("l", "Login / Logout"), ("q", "Quit")],
        }
    }

    pub fn help_root_keys(&self) -> [(&'static str, &'static str); 5] {
        match self {
            Locale::Es => [
                ("p", "Editar lista de contraseñas"),
                ("Ctrl+S", "Guardar lista (editor)"),
                ("Ctrl+D", "Restaurar valores por defecto (editor)"),
                ("F1", "Formato de la lista (editor)"),
                ("Esc", "Salir del editor"),
            ],
            Locale::En => [
                ("p", "Edit passwords list"),
                ("Ctrl+S", "Save list (editor)"),
                ("Ctrl+D", "Restore defaults (editor)"),
                ("F1", "About the list format (editor)"),
                ("Esc", "Leave the editor"),
            ],
        }
    }

    /// Editor hint bar: Save, Restore defaults, About, Back.
    pub fn editor_hints(&self) -> [&'static str; 4] {
        match self {
            Locale::Es => [" Guardar  ", " Restaurar  ", " Acerca de  ", " Volver"],
            Locale::En => [" Save  ", " Restore defaults  ", " About  ", " Back"],
        }
    }

    /// Footer of the help overlay: words around the `?` and `Esc` keys.
    pub fn help_close_hint(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            Locale::Es => ("Pulse ", " o ", " para cerrar"),
            Locale::En => ("Press ", " or ", " to close"),
        }
    }

    pub fn session_heading(&self) -> &'static str {
        match self {
            Locale::Es => "Sesión",
            Locale::En => "Session",
        }
    }

    pub fn version_label(&self) -> &'static str {
        match self {
            Locale::Es => "versión",
            Locale::En => "version",
        }
    }

    pub fn continue_label(&self) -> &'static str {
        match self {
            Locale::Es => "continuar",
            Locale::En => "continue",
        }
    }

    pub fn notification_title(&self) -> &'static str {
        match self {
            Locale::Es => "Notificación",
            Locale::En => "Notification",
        }
    }

    pub fn warning_title(&self) -> &'static str {
        match self {
            Locale::Es => "Advertencia",
            Locale::En => "Warning",
        }
    }

    pub fn valid_password_title(&self) -> &'static str {
        match self {
            Locale::Es => "CONTRASEÑA VALIDA",
            Locale::En => "VALID PASSWORD",
        }
    }

    pub fn error_title(&self) -> &'static str {
        "ERROR"
    }
}

impl FromStr for Locale {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
