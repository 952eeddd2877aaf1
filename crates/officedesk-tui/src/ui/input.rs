//! Keyboard input handling for the TUI.
//!
//! Translates key events into application state changes. Overlays take
//! input first: notice, confirmation, login, help, then the current screen.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{can_add_password_char, App, AppState, Screen};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    if app.current_notice().is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_notice();
        }
        return Ok(false);
    }

    if matches!(app.state, AppState::Confirming(_)) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.resolve_confirm(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.resolve_confirm(false),
            _ => {}
        }
        return Ok(app.state == AppState::Quitting);
    }

    if matches!(app.state, AppState::LoggingIn) {
        handle_login_input(app, key);
        return Ok(false);
    }

    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    match app.screen {
        Screen::PasswordEditor => handle_editor_input(app, key),
        Screen::Home => handle_home_input(app, key),
    }

    Ok(app.state == AppState::Quitting)
}

fn handle_login_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_login(),
        KeyCode::Enter => app.attempt_login(),
        KeyCode::Backspace => {
            app.login_password.pop();
        }
        KeyCode::Char(c) => {
            if can_add_password_char(app.login_password.chars().count(), c) {
                app.login_password.push(c);
                app.login_error = None;
            }
        }
        _ => {}
    }
}

fn handle_home_input(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('r') {
            app.dev_root_shortcut();
        }
        return;
    }

    match key.code {
        KeyCode::Char('l') | KeyCode::Char('L') => app.toggle_login(),
        KeyCode::Char('p') | KeyCode::Char('P') => app.open_password_editor(),
        KeyCode::Char('q') | KeyCode::Char('Q') => app.request_quit(),
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Esc => app.status_message = None,
        _ => {}
    }
}

fn handle_editor_input(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('s') => app.save_password_editor(),
            KeyCode::Char('d') => app.request_restore_defaults(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.request_close_password_editor(),
        KeyCode::F(1) => app.show_editor_about(),
        _ => {
            let Some(editor) = app.editor.as_mut() else {
                return;
            };
            match key.code {
                KeyCode::Enter => {
                    editor.newline();
                }
                KeyCode::Backspace => editor.backspace(),
                KeyCode::Delete => editor.delete(),
                KeyCode::Left => editor.move_left(),
                KeyCode::Right => editor.move_right(),
                KeyCode::Up => editor.move_up(),
                KeyCode::Down => editor.move_down(),
                KeyCode::Home => editor.move_home(),
                KeyCode::End => editor.move_end(),
                KeyCode::Char(c) => {
                    editor.insert_char(c);
                }
                _ => {}
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
