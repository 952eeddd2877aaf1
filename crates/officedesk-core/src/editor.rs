//! Bulk text editing of the credential list.
//!
//! The editor works on a text buffer holding one `('secret', 'identity')`
//! tuple per line. Nothing reaches the committed list until `save` has
//! parsed the whole buffer, checked for a Root account and written the
//! encrypted file.

use tracing::{info, warn};

use crate::credentials::format;
use crate::credentials::{CredentialList, CredentialStore};
use crate::error::{CredentialError, ValidationError};
use crate::locale::Locale;
use crate::notice::Notice;
use crate::session::{MenuSurface, SessionContext};

/// Maximum buffer size accepted from keyboard input.
const MAX_BUFFER_LENGTH: usize = 64 * 1024;

pub struct CredentialEditor {
    buffer: String,
    /// Byte offset into `buffer`, always on a char boundary.
    cursor: usize,
    dirty: bool,
}

impl CredentialEditor {
    /// Open the editor on the committed list, cursor at the top.
    pub fn open(list: &CredentialList) -> Self {
        Self {
            buffer: format::format_lines(list),
            cursor: 0,
            dirty: false,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// True when the buffer has edits that were not saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replace the whole buffer, as a paste would. The cursor moves to the end.
    pub fn set_buffer(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        self.cursor = self.buffer.len();
        self.dirty = true;
    }

    /// Zero-based (line, column) of the cursor, the column counted in chars.
    pub fn cursor_position(&self) -> (usize, usize) {
        let line = self.buffer[..self.cursor].matches('\n').count();
        (line, self.column())
    }

    pub fn insert_char(&mut self, c: char) -> bool {
        if self.buffer.len() + c.len_utf8() > MAX_BUFFER_LENGTH || (c.is_control() && c != '\n') {
            return false;
        }
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
        self.dirty = true;
        true
    }

    pub fn newline(&mut self) -> bool {
        self.insert_char('\n')
    }

    /// Delete the char before the cursor.
    pub fn backspace(&mut self) {
        if let Some(c) = self.buffer[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
            self.buffer.remove(self.cursor);
            self.dirty = true;
        }
    }

    /// Delete the char under the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
            self.dirty = true;
        }
    }

    pub fn move_left(&mut self) {
        if let Some(c) = self.buffer[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.buffer[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    /// Move to the previous line, keeping the column where the line is long
    /// enough.
    pub fn move_up(&mut self) {
        let start = self.line_start(self.cursor);
        if start == 0 {
            return;
        }
        let column = self.column();
        let prev_start = self.line_start(start - 1);
        self.cursor = self.offset_at_column(prev_start, column);
    }

    pub fn move_down(&mut self) {
        let end = self.line_end(self.cursor);
        if end == self.buffer.len() {
            return;
        }
        let column = self.column();
        self.cursor = self.offset_at_column(end + 1, column);
    }

    pub fn move_home(&mut self) {
        self.cursor = self.line_start(self.cursor);
    }

    pub fn move_end(&mut self) {
        self.cursor = self.line_end(self.cursor);
    }

    fn line_start(&self, pos: usize) -> usize {
        self.buffer[..pos].rfind('\n').map_or(0, |i| i + 1)
    }

    fn line_end(&self, pos: usize) -> usize {
        self.buffer[pos..]
            .find('\n')
            .map_or(self.buffer.len(), |i| pos + i)
    }

    fn column(&self) -> usize {
        self.buffer[self.line_start(self.cursor)..self.cursor]
            .chars()
            .count()
    }

    fn offset_at_column(&self, line_start: usize, column: usize) -> usize {
        let end = self.line_end(line_start);
        self.buffer[line_start..end]
            .char_indices()
            .nth(column)
            .map_or(end, |(i, _)| line_start + i)
    }

    /// Parse editor text into a list. The first malformed line rejects the
    /// whole text.
    pub fn parse(text: &str) -> Result<CredentialList, ValidationError> {
        format::parse_lines(text)
    }

    pub fn validate(list: &CredentialList) -> Result<(), ValidationError> {
        list.validate()
    }

    /// Parse, validate and persist the buffer, then install it as the
    /// committed list. On any failure the committed list, the buffer and the
    /// unsaved-edits flag are left as they were.
    pub fn save<S: MenuSurface>(
        &mut self,
        store: &CredentialStore,
        session: &mut SessionContext<S>,
    ) -> Result<(), CredentialError> {
        let list = Self::parse(&self.buffer)?;
        Self::validate(&list)?;
        store.save(&list)?;

        info!(entries = list.len(), "Password list updated");
        session.replace_credentials(list);
        self.dirty = false;
        Ok(())
    }

    /// Put the built-in list in the buffer. Nothing happens unless the
    /// operator confirmed.
    pub fn restore_defaults(&mut self, confirmed: bool, locale: Locale) -> Notice {
        if confirmed {
            self.buffer = format::format_lines(&CredentialList::defaults());
            self.cursor = 0;
            self.dirty = true;
            Notice::info(locale.notification_title(), locale.defaults_restored())
        } else {
            Notice::info(locale.notification_title(), locale.restore_canceled())
        }
    }

    /// Notice describing the outcome of `save`.
    pub fn save_notice(result: &Result<(), CredentialError>, locale: Locale) -> Notice {
        match result {
            Ok(()) => Notice::info(locale.notification_title(), locale.password_list_saved()),
            Err(e) => {
                warn!(error = %e, "Password list not saved");
                let message = match e {
                    CredentialError::Validation(invalid) => locale.validation_message(invalid),
                    other => locale.save_failed(&other.to_string()),
                };
                Notice::warning(locale.warning_title(), message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PassphraseSource;
    use crate::credentials::CredentialEntry;
    use crate::notice::NoticeLevel;
    use crate::session::testing::context;

    fn temp_store() -> (tempfile::TempDir, CredentialStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("passwords.txt.aes"), PassphraseSource::Builtin);
        (dir, store)
    }

    #[test]
    fn test_open_renders_one_tuple_per_line() {
        let editor = CredentialEditor::open(&CredentialList::defaults());
        assert_eq!(
            editor.buffer(),
            "('root', 'Root')\n('admin', 'Admin')\n('user', 'User')\n"
        );
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_parse_example_buffer() {
        let list = CredentialEditor::parse("# comment\n(\"root\",\"Root\")\n(\"x\",\"User\")").unwrap();
        assert_eq!(
            list,
            CredentialList::new(vec![
                CredentialEntry::new("root", "Root"),
                CredentialEntry::new("x", "User"),
            ])
        );
    }

    #[test]
    fn test_typing_marks_dirty() {
        let mut editor = CredentialEditor::open(&CredentialList::defaults());
        assert!(editor.insert_char('#'));
        assert!(editor.is_dirty());
        assert!(editor.buffer().starts_with("#('root', 'Root')\n"));

        editor.backspace();
        assert_eq!(editor.buffer(), format::format_lines(&CredentialList::defaults()));
        assert_eq!(editor.cursor_position(), (0, 0));
    }

    #[test]
    fn test_edit_middle_line_in_place() {
        let mut editor = CredentialEditor::open(&CredentialList::defaults());
        editor.move_down();
        for _ in 0..4 {
            editor.move_right();
        }
        assert_eq!(editor.cursor_position(), (1, 4));

        editor.insert_char('2');
        assert_eq!(
            editor.buffer(),
            "('root', 'Root')\n('ad2min', 'Admin')\n('user', 'User')\n"
        );

        editor.backspace();
        editor.delete();
        assert_eq!(
            editor.buffer(),
            "('root', 'Root')\n('adin', 'Admin')\n('user', 'User')\n"
        );
        assert_eq!(editor.cursor_position(), (1, 4));
        let list = CredentialEditor::parse(editor.buffer()).unwrap();
        assert_eq!(list.identity_for("adin"), Some("Admin"));
    }

    #[test]
    fn test_change_root_password_on_first_line() {
        let mut editor = CredentialEditor::open(&CredentialList::defaults());
        // cursor after "('"
        editor.move_right();
        editor.move_right();
        for _ in 0.."root".len() {
            editor.delete();
        }
        for c in "n3w".chars() {
            editor.insert_char(c);
        }
        let list = CredentialEditor::parse(editor.buffer()).unwrap();
        assert_eq!(list.identity_for("n3w"), Some("Root"));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_vertical_moves_clamp_column() {
        let mut editor = CredentialEditor::open(&CredentialList::default());
        editor.set_buffer("long line here\nab\nanother long one");
        editor.move_home();
        assert_eq!(editor.cursor_position(), (2, 0));
        editor.move_end();
        assert_eq!(editor.cursor_position(), (2, 16));

        editor.move_up();
        assert_eq!(editor.cursor_position(), (1, 2));
        editor.move_up();
        assert_eq!(editor.cursor_position(), (0, 2));
        editor.move_up();
        assert_eq!(editor.cursor_position(), (0, 2));

        editor.move_down();
        editor.move_down();
        editor.move_down();
        assert_eq!(editor.cursor_position(), (2, 2));
    }

    #[test]
    fn test_cursor_moves_over_multibyte_chars() {
        let mut editor = CredentialEditor::open(&CredentialList::default());
        editor.set_buffer("('contraseña', 'Root')");
        editor.move_home();
        for _ in 0..11 {
            editor.move_right();
        }
        assert_eq!(editor.cursor_position(), (0, 11));
        editor.backspace();
        assert_eq!(editor.buffer(), "('contrasea', 'Root')");
        for _ in 0..11 {
            editor.move_left();
        }
        assert_eq!(editor.cursor_position(), (0, 0));
    }

    #[test]
    fn test_control_chars_rejected() {
        let mut editor = CredentialEditor::open(&CredentialList::default());
        assert!(!editor.insert_char('\u{7}'));
        assert!(!editor.is_dirty());
        assert!(editor.newline());
        assert_eq!(editor.buffer(), "\n");
    }

    #[test]
    fn test_restore_defaults_requires_confirmation() {
        let mut editor = CredentialEditor::open(&CredentialList::default());
        editor.set_buffer("('x', 'Root')\n");

        let notice = editor.restore_defaults(false, Locale::En);
        assert_eq!(notice.message, "Restore canceled");
        assert_eq!(editor.buffer(), "('x', 'Root')\n");

        let notice = editor.restore_defaults(true, Locale::En);
        assert_eq!(notice.message, "Defaults restored");
        assert_eq!(
            CredentialEditor::parse(editor.buffer()).unwrap(),
            CredentialList::defaults()
        );
        assert!(editor.is_dirty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_commits_and_persists() {
        let (_dir, store) = temp_store();
        let (mut ctx, _rx) = context(15);
        let mut editor = CredentialEditor::open(ctx.credentials());
        editor.set_buffer("('n3w', 'Root')\n('desk', 'User')\n");

        editor.save(&store, &mut ctx).unwrap();

        assert!(!editor.is_dirty());
        assert_eq!(ctx.credentials().identity_for("n3w"), Some("Root"));
        assert_eq!(store.load().unwrap(), ctx.credentials().clone());
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_without_root_is_refused() {
        let (_dir, store) = temp_store();
        let (mut ctx, _rx) = context(15);
        let mut editor = CredentialEditor::open(ctx.credentials());
        editor.set_buffer("('admin', 'Admin')\n('user', 'User')\n");

        let result = editor.save(&store, &mut ctx);
        assert!(matches!(
            result,
            Err(CredentialError::Validation(ValidationError::MissingRootAccount))
        ));
        assert!(editor.is_dirty());
        assert_eq!(ctx.credentials(), &CredentialList::defaults());
        assert!(!store.path().exists());

        let notice = CredentialEditor::save_notice(&result, Locale::En);
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(notice.message.contains("Root"));

        let notice = CredentialEditor::save_notice(&result, Locale::Es);
        assert_eq!(notice.message, "Falta la cuenta esencial 'Root'");
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_with_bad_line_is_refused() {
        let (_dir, store) = temp_store();
        let (mut ctx, _rx) = context(15);
        let mut editor = CredentialEditor::open(ctx.credentials());
        editor.set_buffer("('root', 'Root')\nopen sesame\n");

        let err = editor.save(&store, &mut ctx).unwrap_err();
        assert!(matches!(
            err,
            CredentialError::Validation(ValidationError::MalformedLine { line: 2, .. })
        ));
        assert_eq!(ctx.credentials(), &CredentialList::defaults());
        assert!(editor.is_dirty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_keeps_current_login() {
        let (_dir, store) = temp_store();
        let (mut ctx, _rx) = context(15);
        ctx.authenticate("root");
        let mut editor = CredentialEditor::open(ctx.credentials());
        editor.set_buffer("('changed', 'Root')\n");
        editor.save(&store, &mut ctx).unwrap();

        assert!(ctx.is_root());
    }
}
