//! OfficeDesk - keyboard-driven front end for the office record manager.
//!
//! Owns the terminal and the event loop. Login, auto-logout and the
//! Root-only password editor live in `officedesk-core`.

mod app;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use officedesk_core::{Config, CredentialError, CredentialStore, LoadOutcome, PassphraseSource};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Exit status when the credential file cannot be decrypted at all
const EXIT_DECRYPTION_UNAVAILABLE: i32 = 2;

const LOG_FILE_NAME: &str = "officedesk.log";

/// Initialize the tracing subscriber for logging.
///
/// The terminal belongs to the UI, so logs go to a file in the data
/// directory. Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = Config::data_dir();
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Logging disabled: cannot create {}: {}", log_dir.display(), e);
        return None;
    }

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();

    let config = Config::load().context("Failed to load configuration")?;

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--set-keychain-passphrase" {
        return set_keychain_passphrase(config);
    }

    let lang = std::env::var("LANG").ok();
    let locale = config
        .resolve_locale(lang.as_deref())
        .context("Cannot start with this locale")?;
    info!(%locale, "OfficeDesk starting");

    let store = CredentialStore::new(config.credentials_path(), config.passphrase_source);
    let loaded = match store.load_or_default() {
        Ok(loaded) => loaded,
        Err(e) => {
            error!(error = %e, "Credential file unusable");
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_DECRYPTION_UNAVAILABLE);
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, locale, store, loaded);

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("OfficeDesk shutting down");
    Ok(())
}

/// Move the credential file to a passphrase kept in the OS keychain.
fn set_keychain_passphrase(config: Config) -> Result<()> {
    let current = CredentialStore::new(config.credentials_path(), config.passphrase_source);
    let loaded = current.load_or_default()?;
    if let LoadOutcome::Fallback { reason, .. } = &loaded {
        warn!(error = %reason, "Re-encrypting the default list");
        eprintln!("Warning: {} - the default list will be saved instead", reason);
    }
    let list = loaded.into_list();

    let passphrase = rpassword::prompt_password("New passphrase: ")?;
    if passphrase.is_empty() {
        bail!("Passphrase must not be empty");
    }
    let again = rpassword::prompt_password("Repeat passphrase: ")?;
    if passphrase != again {
        bail!("Passphrases do not match");
    }

    CredentialStore::store_keychain_passphrase(&passphrase)?;
    let store = CredentialStore::new(config.credentials_path(), PassphraseSource::Keychain);
    if let Err(e) = store.save(&list) {
        if let CredentialError::Write { .. } = e {
            eprintln!("The keychain now holds the new passphrase but the file was not rewritten.");
        }
        return Err(e.into());
    }

    // Only the file contents are persisted, not the environment overrides
    let config_path = Config::config_path()?;
    let mut stored = Config::load_from(&config_path)?;
    stored.passphrase_source = PassphraseSource::Keychain;
    stored
        .save_to(&config_path)
        .context("Failed to save configuration")?;

    eprintln!(
        "Credential file {} now uses the keychain passphrase.",
        store.path().display()
    );
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout so timer events are picked up
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        app.check_session_events();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
