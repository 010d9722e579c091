//! Matchday - live sports fixtures in your terminal
//!
//! A terminal UI application that displays upcoming and in-play fixtures
//! fetched from a remote endpoint, served from a TTL cache and silently
//! revalidated in the background.

use std::io;
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, DisableFocusChange, EnableFocusChange, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use matchday::app::App;
use matchday::cache::CacheManager;
use matchday::cli::{Cli, StartupConfig};
use matchday::fixtures::HttpFixturesClient;
use matchday::refresh::{FixturesOrchestrator, RefreshConfig};
use matchday::store::{FileStore, KeyValueStore, MemoryStore};
use matchday::ui;

/// Sets up a panic hook that restores the terminal before printing the panic
/// message. This ensures the terminal is usable even if the application
/// panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableFocusChange);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Enables tracing when MATCHDAY_LOG holds a filter directive.
///
/// Logs go to stderr; redirect it to a file when running the TUI, e.g.
/// `MATCHDAY_LOG=debug matchday 2>matchday.log`.
fn init_logging() {
    let Ok(filter) = std::env::var("MATCHDAY_LOG") else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}

/// Picks the store backing the cache: on-disk unless `--no-cache` was given
/// or no cache directory can be determined.
fn open_store(config: &StartupConfig) -> Arc<dyn KeyValueStore> {
    if !config.ephemeral_cache {
        if let Some(store) = FileStore::new() {
            return Arc::new(store);
        }
    }
    Arc::new(MemoryStore::new())
}

/// Renders the UI based on the current application state
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    if app.is_initial_loading() {
        render_loading(frame);
    } else {
        ui::render_fixture_list(frame, app);
    }

    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

/// Renders a loading message while the first data is being fetched
fn render_loading(frame: &mut ratatui::Frame) {
    use ratatui::{
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Color, Style},
        widgets::Paragraph,
    };

    let area = frame.area();

    // Center the loading message vertically
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area);

    let loading_text = Paragraph::new("Loading fixtures...")
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);

    frame.render_widget(loading_text, chunks[1]);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    init_logging();

    // Wire the freshness layer together: store, cache (which runs its
    // session sweep on construction), client and orchestrator.
    let cache = CacheManager::new(open_store(&config));
    let fetcher = Arc::new(HttpFixturesClient::new());
    let orchestrator = FixturesOrchestrator::spawn(
        RefreshConfig {
            url: config.url.clone(),
            interval: config.interval,
            cache_ttl: config.cache_ttl,
        },
        cache,
        fetcher,
    );
    let mut state_rx = orchestrator.subscribe();

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();
    app.apply_snapshot(orchestrator.snapshot());

    // Main event loop
    loop {
        terminal.draw(|f| render_ui(f, &app))?;

        // Poll for terminal events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::FocusGained => orchestrator.on_visible(),
                _ => {}
            }
        }

        // Adopt any state update published since the last iteration
        if state_rx.has_changed().unwrap_or(false) {
            app.apply_snapshot(state_rx.borrow_and_update().clone());
        }

        // Forward refresh requests raised by key handling
        if let Some(force) = app.refresh_requested.take() {
            orchestrator.refresh(force);
        }

        if app.should_quit {
            break;
        }
    }

    orchestrator.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableFocusChange)?;

    Ok(())
}
