use std::env;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::mpris::ControlCmd;

mod event_loop;
mod logging;
mod mpris_sync;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_warning) = settings::load_settings();

    if let Err(e) = logging::init(&settings.logging) {
        eprintln!("breathsync: cannot open log file: {e}");
    }
    if let Some(msg) = config_warning {
        log::warn!("{msg}");
    }

    // Folders are resolved against the first argument, or the working directory.
    let base = env::args()
        .nth(1)
        .map(PathBuf::from)
        .map_or_else(env::current_dir, Ok)?;

    let found = startup::discover(&base, &settings.library)?;
    let mut session = startup::build_session(&settings, found)?;
    let mut app = App::new(session.tracks().len());

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut session,
        &mpris,
        &control_rx,
    );

    event_loop::quit_softly(
        &mut session,
        Duration::from_millis(settings.audio.quit_fade_out_ms),
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    log::info!("exiting");
    run_result
}
