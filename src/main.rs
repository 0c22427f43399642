// framewatch - live viewer for model-input visualization frames
// Streams frames from a training process over WebSocket and lets the
// operator scrub back through recent history.

mod app;
mod frame;
mod history;
mod logging;
mod mock;
mod net;
mod session;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::{event::handle_key_event, AppState, Cli};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use session::Session;
use std::io;
use std::time::Duration;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_config()).context("failed to initialize logging")?;
    let config = cli.session_config().context("invalid configuration")?;

    // Socket I/O runs here; the session itself is driven from the UI loop
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("framewatch-io")
        .enable_all()
        .build()
        .context("failed to start I/O runtime")?;

    tracing::info!(endpoint = %config.endpoint, mock = config.mock, capacity = config.capacity, "Starting session");
    let mut app = AppState::new(Session::new(config, runtime.handle().clone()));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Close the socket before the runtime goes away
    app.quit();
    drop(app);
    runtime.shutdown_timeout(Duration::from_millis(500));

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut AppState) -> Result<()> {
    loop {
        app.on_tick();
        terminal.draw(|f| ui::draw(f, app))?;

        if !app.running {
            return Ok(());
        }

        if event::poll(app.poll_timeout())? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key_event(app, key.code);
                }
            }
        }
    }
}
