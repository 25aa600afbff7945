use std::io;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;

use tournament_admin::api::HttpBackend;
use tournament_admin::app::App;
use tournament_admin::config::AdminConfig;
use tournament_admin::http_client::install_http_client;
use tournament_admin::provider::spawn_provider;
use tournament_admin::session::SessionStore;
use tournament_admin::state::Delta;
use tournament_admin::ui;

fn main() -> io::Result<()> {
    let config = AdminConfig::load();
    let session = SessionStore::from_override(config.session_file.clone());
    let client_status = install_http_client(config.request_timeout);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let session_label = session.describe();
    spawn_provider(
        Arc::new(HttpBackend::new(config.base_url.clone())),
        session,
        config.request_workers,
        tx,
        cmd_rx,
    );

    let mut app = App::new(Some(cmd_tx), &config);
    app.state
        .push_log(format!("[INFO] Backend {}", config.base_url));
    app.state.push_log(format!("[INFO] Session {session_label}"));
    if let Err(err) = client_status {
        app.state.push_log(format!("[ERROR] HTTP client: {err:#}"));
    }
    app.mount();
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        app.drain(&rx);
        app.tick(Instant::now());

        terminal.draw(|f| ui::draw(f, &app.state))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
