//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    widgets::{Block, Borders, Gauge, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, Focus};
use crate::audio::Channel;
use crate::config::{ControlsSettings, UiSettings};
use crate::session::{BACKING_SLOTS, BackingChannels, PlaybackState, ProgressView, TrackRowView};

const EMPTY_SLOT: &str = "—";

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("enter".to_string(), "select track".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    // h/l is filled dynamically from config.
    map.insert("0-9".to_string(), "seek to 0-90%".to_string());
    map.insert("tab".to_string(), "tracks/backing".to_string());
    map.insert("+/-".to_string(), "fade".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating the seek step.
fn controls_text(seek_step_percent: u64) -> String {
    let order = ["j/k", "enter", "space/p", "h/l", "0-9", "tab", "+/-", "q"];
    order
        .iter()
        .filter_map(|k| {
            if *k == "h/l" {
                Some(format!("[h/l] seek -/+{seek_step_percent}% (volume on backing)"))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{k}] {v}"))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

fn state_text(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused => "Paused",
        PlaybackState::Stopped => "Stopped",
    }
}

fn padded_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 1,
            top: 0,
            bottom: 0,
        })
}

/// Render the entire UI into `frame`.
pub fn draw<C: Channel>(
    frame: &mut Frame,
    app: &App,
    view: &ProgressView,
    backing: &BackingChannels<C>,
    fade_seconds: u64,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let mut constraints = vec![Constraint::Length(3)];
    constraints.extend(view.rows.iter().map(|_| Constraint::Length(3)));
    constraints.push(Constraint::Length(3));
    constraints.push(Constraint::Length(BACKING_SLOTS as u16 + 2));
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(4));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    // Header
    let header = Paragraph::new(format!("Fade: {fade_seconds}s"))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", ui_settings.header_text))
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // One gauge per rhythm track
    let highlighted = view.selected_indices();
    for (i, row) in view.rows.iter().enumerate() {
        let under_cursor = app.focus == Focus::Tracks && app.cursor == i;
        let style = TrackStyle {
            under_cursor,
            highlighted: highlighted.contains(&i),
        };
        draw_track(frame, chunks[1 + i], row, style, ui_settings);
    }

    let after_tracks = 1 + view.rows.len();

    let status = Paragraph::new(status_text(view, app.status.as_deref()))
        .block(padded_block(" status ".to_string()))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[after_tracks]);

    draw_backing(frame, chunks[after_tracks + 1], app, backing);

    let footer = Paragraph::new(controls_text(controls_settings.seek_step_percent))
        .block(padded_block(" controls ".to_string()))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[after_tracks + 3]);
}

/// State, current track, progress and the last report, e.g.
/// `Playing • 01-slow.mp3 • 42%`.
fn status_text(view: &ProgressView, report: Option<&str>) -> String {
    let mut parts = vec![
        state_text(view.state).to_string(),
        view.current().name.clone(),
    ];
    if let Some(fraction) = view.progress_fraction() {
        parts.push(format!("{:.0}%", fraction * 100.0));
    }
    if let Some(msg) = report {
        parts.push(msg.to_string());
    }
    parts.join(" • ")
}

#[derive(Clone, Copy)]
struct TrackStyle {
    under_cursor: bool,
    highlighted: bool,
}

fn draw_track(
    frame: &mut Frame,
    area: Rect,
    row: &TrackRowView,
    style: TrackStyle,
    ui_settings: &UiSettings,
) {
    let marker = if style.under_cursor { "> " } else { "" };
    let mut block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {marker}{} ", row.name));
    let mut gauge_style = Style::default().fg(Color::DarkGray);
    if style.highlighted {
        block = block
            .border_style(Style::default().fg(Color::Cyan))
            .title_style(Style::default().add_modifier(Modifier::BOLD));
        gauge_style = Style::default().fg(Color::Cyan);
    }

    let label = row.time_text(&ui_settings.time_fields, &ui_settings.time_separator);
    let gauge = Gauge::default()
        .block(block)
        .gauge_style(gauge_style)
        .ratio(row.fraction().unwrap_or(0.0))
        .label(label);
    frame.render_widget(gauge, area);
}

fn draw_backing<C: Channel>(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    backing: &BackingChannels<C>,
) {
    let block = Block::default().borders(Borders::ALL).title(" backing ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1); BACKING_SLOTS])
        .split(inner);

    for (slot, row_area) in rows.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(28), Constraint::Min(10)])
            .split(*row_area);

        let focused = app.focus == Focus::Backing && app.backing_cursor == slot;
        let marker = if focused { "> " } else { "  " };
        let name = backing.name(slot).unwrap_or(EMPTY_SLOT);
        let mut label = Paragraph::new(format!("{marker}{name}"));
        if focused {
            label = label.bold();
        }
        frame.render_widget(label, cols[0]);

        let volume = backing.volume(slot);
        let style = if backing.is_loaded(slot) {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let gauge = Gauge::default()
            .gauge_style(style)
            .ratio(f64::from(volume).clamp(0.0, 1.0))
            .label(format!("{:>3}%", (volume * 100.0).round() as u32));
        frame.render_widget(gauge, cols[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn controls_text_includes_seek_step() {
        let text = controls_text(5);
        assert!(text.contains("[h/l] seek -/+5%"));
        assert!(text.starts_with("[j/k] up/down"));
        assert!(text.ends_with("[q] quit"));
    }

    fn view(elapsed: u64, total: Option<u64>) -> ProgressView {
        ProgressView {
            current_index: 0,
            state: PlaybackState::Playing,
            rows: vec![TrackRowView {
                name: "slow.mp3".to_string(),
                selected: true,
                elapsed: Duration::from_secs(elapsed),
                total: total.map(Duration::from_secs),
            }],
        }
    }

    #[test]
    fn status_text_shows_progress_and_report() {
        assert_eq!(status_text(&view(5, Some(20)), None), "Playing • slow.mp3 • 25%");
        assert_eq!(
            status_text(&view(5, None), Some("failed to load a.mp3")),
            "Playing • slow.mp3 • failed to load a.mp3"
        );
    }

    #[test]
    fn state_text_names_every_state() {
        assert_eq!(state_text(PlaybackState::Playing), "Playing");
        assert_eq!(state_text(PlaybackState::Paused), "Paused");
        assert_eq!(state_text(PlaybackState::Stopped), "Stopped");
    }
}
