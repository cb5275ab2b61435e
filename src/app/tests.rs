use super::*;
use crate::library::Track;
use std::io::Write;

fn t(name: &str) -> Track {
    Track {
        path: PathBuf::from(format!("/music/{name}")),
        title: name.into(),
        filename: name.into(),
        track_number: 0,
    }
}

fn app() -> App {
    App::new(PathBuf::from("/music"), &UiSettings::default())
}

#[test]
fn selection_wraps_and_stops_following() {
    let mut app = app();
    assert!(app.follow_playback);

    app.select_prev(3);
    assert_eq!(app.selected, 2);
    assert!(!app.follow_playback);
    app.select_next(3);
    assert_eq!(app.selected, 0);

    app.select_next(0);
    assert_eq!(app.selected, 0);
}

#[test]
fn started_track_moves_cursor_only_when_following() {
    let mut app = app();
    let started = SessionEvent::TrackStarted {
        index: 4,
        path: PathBuf::from("/music/e.mp3"),
        duration: Duration::from_secs(200),
    };
    app.apply_event(&started);
    assert_eq!(app.selected, 4);
    assert_eq!(app.duration, Duration::from_secs(200));

    app.select_first();
    app.apply_event(&started);
    assert_eq!(app.selected, 0);
}

#[test]
fn position_events_drive_progress() {
    let mut app = app();
    assert_eq!(app.progress(), 0.0);
    app.apply_event(&SessionEvent::Position {
        position: Duration::from_secs(30),
        duration: Duration::from_secs(120),
    });
    assert_eq!(app.progress(), 0.25);

    app.apply_event(&SessionEvent::Stopped);
    assert_eq!(app.position, Duration::ZERO);
}

#[test]
fn load_failure_lands_in_status_line() {
    let mut app = app();
    app.apply_event(&SessionEvent::LoadFailed {
        path: PathBuf::from("/music/broken.flac"),
        reason: "bad header".into(),
    });
    assert_eq!(app.status.as_deref(), Some("skipped broken.flac: bad header"));
}

#[test]
fn spectrum_toggle_is_refused_without_capture() {
    let mut app = app();
    assert!(app.show_spectrum);
    app.toggle_spectrum();
    assert!(!app.show_spectrum);

    app.spectrum_available = false;
    app.toggle_spectrum();
    assert!(!app.show_spectrum);
    assert_eq!(app.status.as_deref(), Some("spectrum unavailable"));
}

#[test]
fn sync_selection_follows_playlist_cursor_and_clamps() {
    let mut playlist = Playlist::new(vec![t("a.mp3"), t("b.mp3"), t("c.mp3")]);
    playlist.set_current(2);
    let mut app = app();
    app.sync_selection(&playlist);
    assert_eq!(app.selected, 2);

    app.follow_playback_off();
    playlist.replace(vec![t("a.mp3")]);
    app.sync_selection(&playlist);
    assert_eq!(app.selected, 0);
}

#[test]
fn metadata_window_reports_unreadable_file_and_closes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noise.mp3");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(b"definitely not audio")
        .unwrap();

    let playlist = Playlist::new(vec![Track::from_path(&path)]);
    let mut app = app();
    app.toggle_metadata_window(&playlist);
    let view = app.metadata_window.as_ref().unwrap();
    assert_eq!(view.path, path);
    assert!(view.metadata.is_err());

    app.toggle_metadata_window(&playlist);
    assert!(app.metadata_window.is_none());
}

#[test]
fn folder_prompt_starts_from_library_folder_and_edits() {
    let mut app = app();
    app.open_prompt(PromptKind::LibraryFolder);
    assert_eq!(app.prompt.as_ref().unwrap().input, "/music");

    app.prompt_backspace();
    app.prompt_push('s');
    app.prompt_push('2');
    let prompt = app.take_prompt().unwrap();
    assert_eq!(prompt.kind, PromptKind::LibraryFolder);
    assert_eq!(prompt.path(), Some(PathBuf::from("/musis2")));
    assert!(app.prompt.is_none());
}

#[test]
fn blank_directory_prompt_yields_no_path() {
    let mut app = app();
    app.open_prompt(PromptKind::AddDirectory);
    app.prompt_push(' ');
    assert_eq!(app.take_prompt().unwrap().path(), None);

    // Typing with no prompt open is ignored.
    app.prompt_push('x');
    assert!(app.prompt.is_none());
}
