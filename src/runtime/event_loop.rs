use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{Action, App, stepped_volume, tenths_fraction};
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::mpris_sync::{fraction_at, offset_target, update_mpris};
use crate::runtime::startup::LiveSession;
use crate::session::Poller;
use crate::ui;

/// Main terminal event loop: handles input, UI drawing, the progress tick
/// and MPRIS. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    session: &mut LiveSession,
    mpris: &MprisHandle,
    control_rx: &mpsc::Receiver<ControlCmd>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut poller = Poller::new(
        Duration::from_millis(settings.session.poll_interval_ms),
        Instant::now(),
    );
    let mut view = session.view();

    loop {
        if let Some(v) = poller.poll(Instant::now(), || session.tick()) {
            view = v;
        }

        for report in session.take_reports() {
            app.set_status(report.to_string());
        }
        app.follow_current(view.current_index);

        // Keep MPRIS in sync even when changes come from auto-advance.
        update_mpris(mpris, &view);

        let fade_seconds = session.fade_seconds();
        terminal.draw(|f| {
            ui::draw(
                f,
                app,
                &view,
                session.backing(),
                fade_seconds,
                &settings.ui,
                &settings.controls,
            )
        })?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, session) {
                return Ok(());
            }
            view = session.view();
        }

        if event::poll(poller.time_until_due(Instant::now()))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, session) {
                    return Ok(());
                }
                view = session.view();
            }
        }
    }
}

/// Apply a media-key command. Returns true when the app should quit.
fn handle_control_cmd(cmd: ControlCmd, session: &mut LiveSession) -> bool {
    log::debug!("MPRIS command: {cmd:?}");
    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::PlayPause => session.toggle_play_pause(),
        ControlCmd::Play => {
            if !session.is_playing() {
                session.toggle_play_pause();
            }
        }
        ControlCmd::Pause => {
            if session.is_playing() {
                session.toggle_play_pause();
            }
        }
        ControlCmd::Next => session.select_next(),
        ControlCmd::Prev => session.select_previous(),
        ControlCmd::SeekBy(offset) => {
            let view = session.view();
            let row = view.current();
            if let Some(fraction) = fraction_at(row, offset_target(row.elapsed, offset)) {
                session.seek(view.current_index, fraction);
            }
        }
        ControlCmd::SetPosition { index, position } => {
            let view = session.view();
            if let Some(fraction) = view.rows.get(index).and_then(|r| fraction_at(r, position)) {
                session.seek(index, fraction);
            }
        }
    }
    false
}

/// Apply a key press. Returns true when the app should quit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    session: &mut LiveSession,
) -> bool {
    let Some(action) = app.action_for(key.code, settings.controls.seek_step_percent) else {
        return false;
    };

    match action {
        Action::Quit => return true,
        Action::CursorUp => app.prev(),
        Action::CursorDown => app.next(),
        Action::SelectCursor => {
            app.clear_status();
            session.select_track(app.cursor);
        }
        Action::TogglePlayPause => {
            app.clear_status();
            session.toggle_play_pause();
        }
        Action::SeekBy(percent) => session.seek_relative(percent as f64 / 100.0),
        Action::SeekCursorTenths(n) => session.seek(app.cursor, tenths_fraction(n)),
        Action::ToggleFocus => app.toggle_focus(),
        Action::VolumeDown | Action::VolumeUp => {
            let slot = app.backing_cursor;
            let backing = session.backing_mut();
            let volume = stepped_volume(
                backing.volume(slot),
                settings.backing.volume_step,
                action == Action::VolumeUp,
            );
            backing.set_volume(slot, volume);
        }
        Action::FadeLonger => session.set_fade_seconds(session.fade_seconds() + 1),
        Action::FadeShorter => {
            session.set_fade_seconds(session.fade_seconds().saturating_sub(1))
        }
    }
    false
}

/// Fade everything out and wait for the fade to finish.
pub fn quit_softly(session: &mut LiveSession, fade: Duration) {
    session.shutdown(fade);
    std::thread::sleep(fade);
}
