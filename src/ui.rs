//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`. It only
//! reads from `App` and `PlayerSession`; nothing here changes playback.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    widgets::{
        Block, Borders, Cell, Clear, Gauge, Padding, Paragraph, Row, Sparkline, Table, TableState,
        Wrap,
    },
};
use std::time::Duration;

use crate::app::{App, MetadataView, PathPrompt, PromptKind};
use crate::audio::PlaybackEngine;
use crate::config::Settings;
use crate::playlist::{SortColumn, SortOrder};
use crate::session::PlayerSession;
use crate::tracker::PlaybackState;

const CONTROLS: &[(&str, &str)] = &[
    ("space/p", "play/pause"),
    ("s", "stop"),
    ("h/l", "prev/next"),
    ("0-9", "seek to 0-90%"),
    ("enter", "play selected"),
    ("j/k", "up/down"),
    ("S", "shuffle"),
    ("F1-F4", "sort #/title/file/path"),
    ("+/-", "volume"),
    ("v", "spectrum"),
    ("K", "metadata"),
    ("r", "rescan"),
    ("o", "open folder"),
    ("a", "add dir"),
    ("q", "quit"),
];

/// Render the controls help text, incorporating the seek step.
fn controls_text(seek_step_percent: u8) -> String {
    let mut parts: Vec<String> = CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect();
    parts.insert(3, format!("[H/L] seek -/+{seek_step_percent}%"));
    parts.join(" | ")
}

/// Format a `Duration` as `m:ss`.
pub fn format_time(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn sort_label(sort: Option<(SortColumn, SortOrder)>) -> String {
    let Some((column, order)) = sort else {
        return "library order".to_string();
    };
    let column = match column {
        SortColumn::Track => "#",
        SortColumn::Title => "title",
        SortColumn::Filename => "file",
        SortColumn::Path => "path",
    };
    let arrow = match order {
        SortOrder::Ascending => "asc",
        SortOrder::Descending => "desc",
    };
    format!("sort: {column} {arrow}")
}

fn status_text<E: PlaybackEngine>(app: &App, session: &PlayerSession<E>) -> String {
    let mut parts: Vec<String> = Vec::new();

    let state = match session.playback_state() {
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused => "Paused",
        PlaybackState::Stopped => "Stopped",
    };
    match session.playlist().current() {
        Some(track) => parts.push(format!("{state}: {}", track.title)),
        None => parts.push(state.to_string()),
    }

    parts.push(format!("Vol {:.0}%", session.volume() * 100.0));
    parts.push(sort_label(session.playlist().sort_state()));
    parts.push(format!("Dir: {}", app.folder.display()));

    if !app.output_available {
        parts.push("output unavailable".to_string());
    }
    if !app.spectrum_available {
        parts.push("spectrum unavailable".to_string());
    }
    if let Some(msg) = &app.status {
        parts.push(msg.clone());
    }

    parts.join(" • ")
}

/// Compute a centered rectangle of roughly the given size that always fits
/// inside `r`. The minimum size gives way when `r` itself is smaller.
fn centered_rect_sized(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.max(10).min(r.width.saturating_sub(2)).min(r.width);
    let height = height.max(3).min(r.height.saturating_sub(2)).min(r.height);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn metadata_text(view: &MetadataView) -> String {
    let meta = match &view.metadata {
        Ok(m) => m,
        Err(e) => return format!("{e}\nPath: {}", view.path.display()),
    };
    let or_dash = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
    format!(
        "Title: {}\nTrack: {}\nDuration: {}\nBitrate: {}\nSample rate: {}\nChannels: {}\nPath: {}",
        or_dash(meta.title.clone()),
        or_dash(meta.track_number.map(|n| n.to_string())),
        format_time(meta.duration),
        or_dash(meta.bitrate.map(|b| format!("{b} kbps"))),
        or_dash(meta.sample_rate.map(|s| format!("{s} Hz"))),
        or_dash(meta.channels.map(|c| c.to_string())),
        view.path.display()
    )
}

fn prompt_title(prompt: &PathPrompt) -> &'static str {
    match prompt.kind {
        PromptKind::LibraryFolder => " library folder (enter scans, esc cancels) ",
        PromptKind::AddDirectory => " add directory (enter adds, esc cancels) ",
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw<E: PlaybackEngine>(
    frame: &mut Frame,
    app: &App,
    session: &PlayerSession<E>,
    settings: &Settings,
) {
    let spectrum_height = if app.show_spectrum && app.spectrum_available {
        10
    } else {
        0
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(spectrum_height),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(settings.ui.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" allegro ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status = Paragraph::new(status_text(app, session))
        .block(Block::bordered().padding(Padding::left(1)).title(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    // Track table
    let playing = session.playlist().current_index();
    let rows: Vec<Row> = session
        .playlist()
        .tracks()
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let marker = if Some(i) == playing { "▶" } else { "" };
            let row = Row::new(vec![
                Cell::from(marker),
                Cell::from(format!("{:02}", t.track_number)),
                Cell::from(t.title.clone()),
                Cell::from(t.filename.clone()),
            ]);
            if Some(i) == playing {
                row.bold()
            } else {
                row
            }
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Fill(2),
            Constraint::Fill(1),
        ],
    )
    .header(Row::new(vec!["", "#", "Title", "Filename"]).underlined())
    .block(Block::default().borders(Borders::ALL).title(" tracks "))
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = TableState::default();
    if !session.playlist().is_empty() {
        state.select(Some(app.selected));
    }
    frame.render_stateful_widget(table, chunks[2], &mut state);

    // Progress
    let label = format!("{} / {}", format_time(app.position), format_time(app.duration));
    let gauge = Gauge::default()
        .block(Block::bordered().title(" position "))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(app.progress())
        .label(label);
    frame.render_widget(gauge, chunks[3]);

    // Spectrum
    if spectrum_height > 0 {
        let area = chunks[4];
        let floor = settings.spectrum.floor_db;
        let span = (settings.spectrum.ceiling_db - floor).max(1.0);
        let bars: Vec<u64> = app
            .spectrum
            .downsample(usize::from(area.width.saturating_sub(2)))
            .into_iter()
            .map(|v| (v - floor).clamp(0.0, span).round() as u64)
            .collect();
        let sparkline = Sparkline::default()
            .block(Block::bordered().title(" spectrum "))
            .data(bars)
            .max(span.round() as u64)
            .style(Style::default().fg(Color::Green));
        frame.render_widget(sparkline, area);
    }

    // Overlay metadata popup, kept inside the table area.
    if let Some(view) = &app.metadata_window {
        let popup_area = centered_rect_sized(72, 10, chunks[2]);
        frame.render_widget(Clear, popup_area);
        let meta = Paragraph::new(metadata_text(view))
            .block(
                Block::default()
                    .padding(Padding::left(1))
                    .borders(Borders::ALL)
                    .title(" metadata (K closes) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(meta, popup_area);
    }

    if let Some(prompt) = &app.prompt {
        let popup_area = centered_rect_sized(72, 3, chunks[2]);
        frame.render_widget(Clear, popup_area);
        let input = Paragraph::new(format!("{}_", prompt.input)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(prompt_title(prompt)),
        );
        frame.render_widget(input, popup_area);
    }

    let footer = Paragraph::new(controls_text(settings.playback.seek_step_percent))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding::left(1)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[5]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::UnavailableEngine;
    use crate::config::PlaybackSettings;
    use crate::library::Track;
    use crate::playlist::Playlist;
    use ratatui::{Terminal, backend::TestBackend};
    use std::path::PathBuf;

    #[test]
    fn format_time_is_minutes_and_padded_seconds() {
        assert_eq!(format_time(Duration::ZERO), "0:00");
        assert_eq!(format_time(Duration::from_millis(65_900)), "1:05");
        assert_eq!(format_time(Duration::from_secs(3_600)), "60:00");
    }

    #[test]
    fn controls_text_mentions_seek_step() {
        let text = controls_text(7);
        assert!(text.contains("[H/L] seek -/+7%"));
        assert!(text.starts_with("[space/p] play/pause"));
    }

    #[test]
    fn sort_label_names_column_and_direction() {
        assert_eq!(sort_label(None), "library order");
        assert_eq!(
            sort_label(Some((SortColumn::Title, SortOrder::Descending))),
            "sort: title desc"
        );
    }

    #[test]
    fn centered_rect_never_leaves_its_area() {
        let area = Rect::new(4, 2, 8, 4);
        let popup = centered_rect_sized(72, 10, area);
        assert!(popup.x >= area.x && popup.right() <= area.right());
        assert!(popup.y >= area.y && popup.bottom() <= area.bottom());

        let roomy = centered_rect_sized(20, 5, Rect::new(0, 0, 100, 40));
        assert_eq!((roomy.width, roomy.height), (20, 5));
        assert_eq!((roomy.x, roomy.y), (40, 17));
    }

    #[test]
    fn draws_path_prompt_at_any_terminal_size() {
        let session = PlayerSession::new(
            UnavailableEngine::new("no device"),
            Playlist::default(),
            &PlaybackSettings::default(),
        );
        let mut app = App::new(PathBuf::from("/m"), &Default::default());
        app.open_prompt(PromptKind::LibraryFolder);
        let settings = Settings::default();

        let mut small = Terminal::new(TestBackend::new(40, 12)).unwrap();
        small.draw(|f| draw(f, &app, &session, &settings)).unwrap();

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal
            .draw(|f| draw(f, &app, &session, &settings))
            .unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("library folder"));
        assert!(screen.contains("/m_"));
    }

    #[test]
    fn draws_track_table_and_degraded_markers() {
        let playlist = Playlist::new(vec![Track::from_path(&PathBuf::from("/m/intro.flac"))]);
        let session = PlayerSession::new(
            UnavailableEngine::new("no device"),
            playlist,
            &PlaybackSettings::default(),
        );
        let mut app = App::new(PathBuf::from("/m"), &Default::default());
        app.output_available = false;
        app.spectrum_available = false;
        let settings = Settings::default();

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal
            .draw(|f| draw(f, &app, &session, &settings))
            .unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("intro.flac"));
        assert!(screen.contains("output unavailable"));
        assert!(screen.contains("0:00 / 0:00"));
    }
}
