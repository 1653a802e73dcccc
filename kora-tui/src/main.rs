//! KORA TUI — terminal viewer for AI investment reports.
//!
//! Screens:
//! 1. Selection — company form and recent companies
//! 2. Report — staged report sections, price chart, loading overlay
//! 3. Chat sidebar — follow-up questions about the open report
//!
//! `kora-tui [NAME TICKER]` prefills the form and starts a report at once.

mod app;
mod input;
mod persistence;
mod theme;
mod ui;
mod worker;

use std::fs::File;
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kora_runner::{ClientConfig, HttpBackend};

use crate::app::AppState;
use crate::worker::WorkerCommand;

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    // Paths
    let app_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kora");
    let state_path = app_dir.join("state.json");
    let config_path = app_dir.join("config.toml");
    let log_dir = dirs::data_dir()
        .map(|d| d.join("kora"))
        .unwrap_or_else(|| app_dir.clone());

    init_logging(&log_dir)?;

    let config = ClientConfig::load(config_path.exists().then_some(config_path.as_path()))
        .with_context(|| format!("loading {}", config_path.display()))?;
    info!(base_url = %config.base_url, "starting kora-tui");

    let backend = HttpBackend::new(config.clone()).context("building HTTP client")?;

    // Load persisted state
    let persisted = persistence::load(&state_path);

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();

    let worker_handle = worker::spawn_worker(Arc::new(backend), config.loading, cmd_rx, resp_tx)
        .context("spawning worker thread")?;

    let mut app = AppState::new(cmd_tx.clone(), resp_rx);
    persistence::apply(&mut app, persisted);
    app.export_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    // Optional positional NAME TICKER: prefill and run.
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [name, ticker, ..] = args.as_slice() {
        app.form.name = name.clone();
        app.form.ticker = ticker.clone();
        app.form.corp_code.clear();
        app.form.request.clear();
        app.start_report();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the main event loop
    let result = run_app(&mut terminal, &mut app);

    // Save state before exit
    let persisted = persistence::extract(&app);
    if let Err(e) = persistence::save(&state_path, &persisted) {
        tracing::warn!(error = %e, "could not save state");
    }

    // Shutdown worker
    if let Some(token) = app.run_token.take() {
        token.cancel();
    }
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Logs go to a file; stdout belongs to the terminal UI.
fn init_logging(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join("kora-tui.log");
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            app.handle_worker_response(resp);
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}
