use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, PromptKind};
use crate::audio::PlaybackEngine;
use crate::config::{self, LibraryState, resolve_state_path};
use crate::error::Result as PlayerResult;
use crate::library::scan;
use crate::playlist::SortColumn;
use crate::session::PlayerSession;
use crate::ui;

use super::Spectrum;
use super::folder;

const VOLUME_STEP: f32 = 0.05;

/// Main terminal event loop: polls the session on every tick, forwards
/// spectrum frames and handles keys. Returns `Ok(())` when the user quits.
pub(super) fn run<E: PlaybackEngine>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    session: &mut PlayerSession<E>,
    state: &mut LibraryState,
    spectrum: Option<&Spectrum>,
    gate: &AtomicBool,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick = Duration::from_millis(settings.playback.tick_ms);
    let mut last_tick = Instant::now();

    loop {
        if last_tick.elapsed() >= tick {
            last_tick = Instant::now();
            for event in session.tick() {
                app.apply_event(&event);
            }
        }

        // Only analyze capture while something is audibly playing.
        gate.store(session.engine().is_busy(), Ordering::Relaxed);
        if let Some(frame) = spectrum.and_then(|s| s.worker().latest()) {
            app.set_spectrum(frame);
        }
        app.sync_selection(session.playlist());

        terminal.draw(|f| ui::draw(f, app, session, settings))?;

        let wait = tick
            .saturating_sub(last_tick.elapsed())
            .min(Duration::from_millis(50));
        if event::poll(wait)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, session, state) {
                    break;
                }
                for event in session.take_events() {
                    app.apply_event(&event);
                }
            }
        }
    }

    Ok(())
}

/// Log a failed user action and show it in the status line.
fn report(app: &mut App, result: PlayerResult<()>) {
    if let Err(e) = result {
        log::warn!("{e}");
        app.set_status(e.to_string());
    }
}

/// Keys while the path prompt is open. Everything typed goes to the prompt.
fn handle_prompt_key<E: PlaybackEngine>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    session: &mut PlayerSession<E>,
    state: &mut LibraryState,
) {
    match key.code {
        KeyCode::Esc => app.prompt = None,
        KeyCode::Backspace => app.prompt_backspace(),
        KeyCode::Char(c) => app.prompt_push(c),
        KeyCode::Enter => {
            let Some(prompt) = app.take_prompt() else {
                return;
            };
            let Some(path) = prompt.path() else {
                return;
            };
            let r = match prompt.kind {
                PromptKind::LibraryFolder => folder::change_folder(
                    session,
                    app,
                    state,
                    resolve_state_path().as_deref(),
                    path,
                    &settings.library,
                ),
                PromptKind::AddDirectory => {
                    folder::add_directory(session, app, &path, &settings.library)
                }
            };
            report(app, r.map(|_| ()));
        }
        _ => {}
    }
}

/// Returns `true` when the user asked to quit.
fn handle_key_event<E: PlaybackEngine>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    session: &mut PlayerSession<E>,
    state: &mut LibraryState,
) -> bool {
    if app.prompt.is_some() {
        handle_prompt_key(key, settings, app, session, state);
        return false;
    }

    let len = session.playlist().len();
    let step = i32::from(settings.playback.seek_step_percent);

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char(' ') | KeyCode::Char('p') => {
            app.follow_playback_on();
            let r = session.play_pause();
            report(app, r);
        }
        KeyCode::Char('s') => session.stop(),
        KeyCode::Char('l') | KeyCode::Char('n') => {
            app.follow_playback_on();
            let r = session.next();
            report(app, r);
        }
        KeyCode::Char('h') | KeyCode::Char('b') => {
            app.follow_playback_on();
            let r = session.previous();
            report(app, r);
        }
        KeyCode::Char('H') => {
            let r = session.seek_by_percent(-step);
            report(app, r);
        }
        KeyCode::Char('L') => {
            let r = session.seek_by_percent(step);
            report(app, r);
        }
        KeyCode::Char(c @ '0'..='9') => {
            let tenths = c.to_digit(10).unwrap_or(0);
            let r = session.seek(f64::from(tenths) / 10.0);
            report(app, r);
        }
        KeyCode::Char('S') => session.shuffle(),
        KeyCode::F(1) => session.sort_by_column(SortColumn::Track),
        KeyCode::F(2) => session.sort_by_column(SortColumn::Title),
        KeyCode::F(3) => session.sort_by_column(SortColumn::Filename),
        KeyCode::F(4) => session.sort_by_column(SortColumn::Path),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            session.set_volume(session.volume() + VOLUME_STEP);
        }
        KeyCode::Char('-') => {
            session.set_volume(session.volume() - VOLUME_STEP);
        }
        KeyCode::Char('v') => app.toggle_spectrum(),
        KeyCode::Char('K') => app.toggle_metadata_window(session.playlist()),
        KeyCode::Char('f') => app.follow_playback_on(),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(len),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(len),
        KeyCode::Char('g') | KeyCode::Home => app.select_first(),
        KeyCode::Char('G') | KeyCode::End => app.select_last(len),
        KeyCode::Enter => {
            if len > 0 {
                app.follow_playback_on();
                let r = session.play_index(app.selected);
                report(app, r);
            }
        }
        KeyCode::Char('r') => {
            let tracks = scan(&app.folder, &settings.library);
            let found = tracks.len();
            session.replace_tracks(tracks);
            app.set_status(format!("rescanned: {found} tracks"));
        }
        KeyCode::Char('o') => app.open_prompt(PromptKind::LibraryFolder),
        KeyCode::Char('a') => app.open_prompt(PromptKind::AddDirectory),
        KeyCode::Esc => app.metadata_window = None,
        _ => {}
    }
    false
}
