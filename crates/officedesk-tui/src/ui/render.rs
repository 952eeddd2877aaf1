use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use officedesk_core::{Locale, NoticeLevel};

use crate::app::{App, AppState, ConfirmAction, Screen};

use super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar with menu
            Constraint::Length(1), // Current user header
            Constraint::Min(8),    // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_header(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame, app.locale);
    }

    if matches!(app.state, AppState::LoggingIn) {
        render_login_overlay(frame, app);
    }

    if let AppState::Confirming(action) = app.state {
        render_confirm_overlay(frame, app, action);
    }

    // Notices sit above everything else
    if app.current_notice().is_some() {
        render_notice_overlay(frame, app);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let menu = app.session.surface();
    let title = "  OfficeDesk";

    let spans = vec![
        Span::styled(title, styles::title_style()),
        Span::raw("    "),
        Span::styled("[l] ", styles::help_key_style()),
        Span::styled(menu.login_label.clone(), styles::menu_style(true)),
        Span::styled("  |  ", styles::muted_style()),
        Span::styled("[p] ", styles::help_key_style()),
        Span::styled(
            format!("Root: {}", app.locale.editor_title()),
            styles::menu_style(menu.restricted_enabled),
        ),
        Span::styled("  |  ", styles::muted_style()),
        Span::styled(format!("[?] {}", app.locale.help_label()), styles::muted_style()),
    ];

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let header = &app.session.surface().header;
    let style = if app.session.state().is_anonymous() {
        styles::muted_style()
    } else {
        styles::success_style()
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(format!("  {}", header), style)));
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.screen {
        Screen::Home => render_home(frame, app, area),
        Screen::PasswordEditor => render_password_editor(frame, app, area),
    }
}

fn render_home(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![Line::from("")];

    let locale = app.locale;

    if app.session.state().is_anonymous() {
        lines.push(Line::from(vec![
            Span::styled("  [l] ", styles::help_key_style()),
            Span::styled(locale.login_hint(), styles::muted_style()),
        ]));
    } else {
        lines.push(Line::from(Span::styled(
            format!("  {}", locale.logged_in_as(app.session.identity())),
            styles::text_style(),
        )));
        if app.session.is_root() {
            lines.push(Line::from(vec![
                Span::styled("  [p] ", styles::help_key_style()),
                Span::styled(locale.edit_list_hint(), styles::muted_style()),
            ]));
        }
    }

    lines.push(Line::from(""));
    let auto_logout = locale.auto_logout_policy(app.session.timer().duration().as_secs());
    lines.push(Line::from(Span::styled(
        format!("  {}", auto_logout),
        styles::muted_style(),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false))
        .title(Span::styled(" Home ", styles::title_style()));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_password_editor(frame: &mut Frame, app: &App, area: Rect) {
    let Some(editor) = app.editor.as_ref() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let (cursor_line, cursor_column) = editor.cursor_position();
    let lines: Vec<Line> = editor
        .buffer()
        .split('\n')
        .enumerate()
        .map(|(i, line)| {
            if i == cursor_line {
                cursor_line_spans(line, cursor_column)
            } else {
                Line::from(Span::styled(line.to_string(), styles::text_style()))
            }
        })
        .collect();

    // Keep the cursor line visible
    let inner_height = chunks[0].height.saturating_sub(2) as usize;
    let scroll = cursor_line.saturating_sub(inner_height.saturating_sub(1)) as u16;

    let title = if editor.is_dirty() {
        format!(" {} * ", app.locale.editor_title())
    } else {
        format!(" {} ", app.locale.editor_title())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .title(Span::styled(title, styles::title_style()));

    frame.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), chunks[0]);

    let mut hints = vec![Span::raw(" ")];
    let [save, restore, about, back] = app.locale.editor_hints();
    for (key, desc, enabled) in [
        ("^S", save, editor.is_dirty()),
        ("^D", restore, true),
        ("F1", about, true),
        ("Esc", back, true),
    ] {
        hints.push(Span::styled(key, styles::help_key_style()));
        hints.push(Span::styled(desc, styles::menu_style(enabled)));
    }
    frame.render_widget(Paragraph::new(Line::from(hints)), chunks[1]);
}

/// Split a line around the cursor and highlight the char under it.
fn cursor_line_spans(line: &str, column: usize) -> Line<'static> {
    let before: String = line.chars().take(column).collect();
    let mut rest = line.chars().skip(column);
    let under = rest.next().map_or_else(|| " ".to_string(), |c| c.to_string());
    let after: String = rest.collect();

    Line::from(vec![
        Span::styled(before, styles::text_style()),
        Span::styled(under, styles::selected_style()),
        Span::styled(after, styles::text_style()),
    ])
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[l]ogin | [q]uit";

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        format!(" {} ", app.session_status())
    };
    let right_text = format!(" {} | {} ", chrono::Local::now().format("%H:%M"), shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame, locale: Locale) {
    let area = centered_rect_fixed(52, 20, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");
    let (press, or, close) = locale.help_close_hint();

    let mut help_text = vec![
        Line::from(Span::styled("  OfficeDesk", styles::title_style())),
        Line::from(Span::styled(
            format!("  {} {}", locale.version_label(), version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" {}", locale.session_heading()),
            styles::highlight_style(),
        )),
    ];
    help_text.extend(locale.help_session_keys().into_iter().map(|(k, d)| help_line(k, d)));
    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(" Root", styles::highlight_style())));
    help_text.extend(locale.help_root_keys().into_iter().map(|(k, d)| help_line(k, d)));
    help_text.push(Line::from(""));
    help_text.push(Line::from(vec![
        Span::styled(format!("       {}", press), styles::muted_style()),
        Span::styled("?", styles::help_key_style()),
        Span::styled(or, styles::muted_style()),
        Span::styled("Esc", styles::help_key_style()),
        Span::styled(close, styles::muted_style()),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() { 9 } else { 7 };
    let area = centered_rect_fixed(56, height, frame.area());
    frame.render_widget(Clear, area);

    let locale = app.locale;
    let mut lines = vec![Line::from("")];

    let password_masked: String = "*".repeat(app.login_password.chars().count().min(24));
    lines.push(Line::from(vec![
        Span::raw("   "),
        Span::styled(format!("{}: [", locale.password_label()), styles::muted_style()),
        Span::styled(format!("{:<24}▌", password_masked), styles::selected_style()),
        Span::styled("]", styles::muted_style()),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("   [Enter] ", styles::help_key_style()),
        Span::styled(locale.accept_label(), styles::muted_style()),
        Span::styled("   [Esc] ", styles::help_key_style()),
        Span::styled(locale.cancel_label(), styles::muted_style()),
    ]));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!(" {}", error), styles::error_style())));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .title(Span::styled(" Login ", styles::title_style()))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_confirm_overlay(frame: &mut Frame, app: &App, action: ConfirmAction) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("   {}", app.confirm_prompt(action)),
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   [Y] ", styles::help_key_style()),
            Span::styled(app.locale.accept_label(), styles::muted_style()),
            Span::styled("   [N] ", styles::help_key_style()),
            Span::styled(app.locale.cancel_label(), styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_notice_overlay(frame: &mut Frame, app: &App) {
    let Some(notice) = app.current_notice() else {
        return;
    };
    let area = centered_rect_fixed(60, 10, frame.area());
    frame.render_widget(Clear, area);

    let (border, text) = match notice.level {
        NoticeLevel::Info => (styles::border_style(true), styles::text_style()),
        NoticeLevel::Warning => (styles::highlight_style(), styles::highlight_style()),
        NoticeLevel::Error => (styles::error_style(), styles::error_style()),
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(notice.message.clone(), text)),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Enter] ", styles::help_key_style()),
            Span::styled(app.locale.continue_label(), styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(format!(" {} ", notice.title), styles::title_style()))
        .style(Style::default());

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    use officedesk_core::{Config, CredentialList, CredentialStore, LoadOutcome, Locale, PassphraseSource};

    fn screen_text(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_guest_header() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("p.aes"), PassphraseSource::Builtin);
        let app = App::new(
            Config::default(),
            Locale::En,
            store,
            LoadOutcome::Loaded(CredentialList::defaults()),
        );

        let text = screen_text(&app);
        assert!(text.contains("Current user is: Guest"));
        assert!(text.contains("Login"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_spanish_help_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("p.aes"), PassphraseSource::Builtin);
        let mut app = App::new(
            Config::default(),
            Locale::Es,
            store,
            LoadOutcome::Loaded(CredentialList::defaults()),
        );
        app.state = AppState::ShowingHelp;

        let text = screen_text(&app);
        assert!(text.contains("[?] Ayuda"));
        assert!(text.contains("Editar lista de contraseñas"));
        assert!(text.contains("para cerrar"));
        assert!(!text.contains("Quit"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_editor_scrolls_to_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("p.aes"), PassphraseSource::Builtin);
        let mut app = App::new(
            Config {
                dev_root_shortcut: true,
                ..Config::default()
            },
            Locale::Es,
            store,
            LoadOutcome::Loaded(CredentialList::defaults()),
        );
        app.dev_root_shortcut();
        app.dismiss_notice();
        app.open_password_editor();
        if let Some(editor) = app.editor.as_mut() {
            let text: String = (0..60).map(|i| format!("('pw{}', 'User')\n", i)).collect();
            editor.set_buffer(format!("('root', 'Root')\n{}", text));
        }

        let text = screen_text(&app);
        assert!(text.contains("Editar Lista de Contraseñas *"));
        assert!(text.contains("('pw59', 'User')"));
        assert!(text.contains("Guardar"));
        assert!(!text.contains("('root', 'Root')"));
    }

    #[test]
    fn test_cursor_line_spans() {
        let line = cursor_line_spans("abc", 1);
        let parts: Vec<_> = line.spans.iter().map(|s| s.content.to_string()).collect();
        assert_eq!(parts, vec!["a", "b", "c"]);

        let line = cursor_line_spans("ab", 2);
        let parts: Vec<_> = line.spans.iter().map(|s| s.content.to_string()).collect();
        assert_eq!(parts, vec!["ab", " ", ""]);
    }

    #[test]
    fn test_centered_rect_fixed_clamps() {
        let r = centered_rect_fixed(80, 40, Rect::new(0, 0, 50, 20));
        assert_eq!(r, Rect::new(0, 0, 50, 20));
    }
}
