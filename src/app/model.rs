//! Front-end state: which pane has focus, where the cursors are and the last
//! message worth showing. Playback state itself lives in the session.

use crossterm::event::KeyCode;

use crate::session::BACKING_SLOTS;

/// Which list the `j`/`k` and `h`/`l` keys act on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Tracks,
    Backing,
}

/// A user intent decoded from a key press.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Action {
    Quit,
    CursorUp,
    CursorDown,
    SelectCursor,
    TogglePlayPause,
    /// Seek the current track by this many percent.
    SeekBy(i64),
    /// Seek the track under the cursor to `n * 10%`.
    SeekCursorTenths(u8),
    ToggleFocus,
    VolumeDown,
    VolumeUp,
    FadeLonger,
    FadeShorter,
}

/// The main UI model.
#[derive(Debug, Clone)]
pub struct App {
    pub focus: Focus,
    pub cursor: usize,
    pub backing_cursor: usize,
    pub status: Option<String>,
    track_count: usize,
    last_current: usize,
}

impl App {
    pub fn new(track_count: usize) -> Self {
        Self {
            focus: Focus::Tracks,
            cursor: 0,
            backing_cursor: 0,
            status: None,
            track_count,
            last_current: 0,
        }
    }

    /// Decode a key press under the current focus.
    pub fn action_for(&self, code: KeyCode, seek_step_percent: u64) -> Option<Action> {
        let step = seek_step_percent.min(100) as i64;
        let action = match (code, self.focus) {
            (KeyCode::Char('q'), _) => Action::Quit,
            (KeyCode::Char('k') | KeyCode::Up, _) => Action::CursorUp,
            (KeyCode::Char('j') | KeyCode::Down, _) => Action::CursorDown,
            (KeyCode::Enter, Focus::Tracks) => Action::SelectCursor,
            (KeyCode::Char(' ') | KeyCode::Char('p'), _) => Action::TogglePlayPause,
            (KeyCode::Char('h') | KeyCode::Left, Focus::Tracks) => Action::SeekBy(-step),
            (KeyCode::Char('l') | KeyCode::Right, Focus::Tracks) => Action::SeekBy(step),
            (KeyCode::Char('h') | KeyCode::Left, Focus::Backing) => Action::VolumeDown,
            (KeyCode::Char('l') | KeyCode::Right, Focus::Backing) => Action::VolumeUp,
            (KeyCode::Char(c @ '0'..='9'), Focus::Tracks) => {
                Action::SeekCursorTenths(c as u8 - b'0')
            }
            (KeyCode::Tab | KeyCode::BackTab, _) => Action::ToggleFocus,
            (KeyCode::Char('+') | KeyCode::Char('='), _) => Action::FadeLonger,
            (KeyCode::Char('-'), _) => Action::FadeShorter,
            _ => return None,
        };
        Some(action)
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Tracks => Focus::Backing,
            Focus::Backing => Focus::Tracks,
        };
    }

    /// Move the focused cursor down; stops at the last row.
    pub fn next(&mut self) {
        match self.focus {
            Focus::Tracks => {
                if self.cursor + 1 < self.track_count {
                    self.cursor += 1;
                }
            }
            Focus::Backing => {
                if self.backing_cursor + 1 < BACKING_SLOTS {
                    self.backing_cursor += 1;
                }
            }
        }
    }

    /// Move the focused cursor up; stops at the first row.
    pub fn prev(&mut self) {
        match self.focus {
            Focus::Tracks => self.cursor = self.cursor.saturating_sub(1),
            Focus::Backing => self.backing_cursor = self.backing_cursor.saturating_sub(1),
        }
    }

    /// Keep the track cursor on the session's current track whenever that
    /// changes underneath us (natural advance, media keys).
    pub fn follow_current(&mut self, current: usize) {
        if current != self.last_current {
            self.last_current = current;
            self.cursor = current.min(self.track_count.saturating_sub(1));
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }
}

/// `n` tenths as a seek fraction.
pub fn tenths_fraction(n: u8) -> f64 {
    f64::from(n.min(10)) / 10.0
}

/// Volume after one `step` in the given direction, kept within `0.0..=1.0`.
pub fn stepped_volume(current: f32, step: f32, up: bool) -> f32 {
    let next = if up { current + step } else { current - step };
    // Snap to the step grid so repeated presses land on round values.
    let snapped = if step > 0.0 {
        (next / step).round() * step
    } else {
        next
    };
    snapped.clamp(0.0, 1.0)
}
