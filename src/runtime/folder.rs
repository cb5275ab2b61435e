//! Library folder actions behind the path prompt: switch the library to
//! another folder, or append one directory's tracks to the playlist.

use std::path::{Path, PathBuf};

use crate::app::App;
use crate::audio::PlaybackEngine;
use crate::config::{LibrarySettings, LibraryState};
use crate::error::{PlayerError, Result};
use crate::library::scan;
use crate::session::PlayerSession;

/// Record `folder` as the library folder and write the state file.
/// A failed write is logged; the folder still applies to this run.
pub(crate) fn remember_folder(
    state: &mut LibraryState,
    folder: PathBuf,
    state_path: Option<&Path>,
) {
    state.folder = folder;
    let Some(path) = state_path else {
        log::warn!("no config directory; folder not remembered");
        return;
    };
    match state.save_to(path) {
        Ok(()) => log::debug!("saved library folder to {}", path.display()),
        Err(e) => log::warn!("cannot remember folder: {e}"),
    }
}

/// Rebuild the playlist from `folder`. Whatever is playing keeps playing.
/// Returns the number of tracks found.
pub(crate) fn change_folder<E: PlaybackEngine>(
    session: &mut PlayerSession<E>,
    app: &mut App,
    state: &mut LibraryState,
    state_path: Option<&Path>,
    folder: PathBuf,
    settings: &LibrarySettings,
) -> Result<usize> {
    if !folder.is_dir() {
        return Err(PlayerError::NotADirectory(folder));
    }
    let tracks = scan(&folder, settings);
    let found = tracks.len();
    session.replace_tracks(tracks);
    log::info!("library folder is now {} ({found} tracks)", folder.display());

    app.folder = folder.clone();
    app.selected = 0;
    app.set_status(format!("{found} tracks in {}", folder.display()));
    remember_folder(state, folder, state_path);
    Ok(found)
}

/// Scan `dir` and append what is not already listed. Returns how many
/// tracks were added.
pub(crate) fn add_directory<E: PlaybackEngine>(
    session: &mut PlayerSession<E>,
    app: &mut App,
    dir: &Path,
    settings: &LibrarySettings,
) -> Result<usize> {
    if !dir.is_dir() {
        return Err(PlayerError::NotADirectory(dir.to_path_buf()));
    }
    let added = session.add_tracks(scan(dir, settings));
    log::info!("added {added} tracks from {}", dir.display());
    app.set_status(format!("added {added} tracks from {}", dir.display()));
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::scripted::ScriptedEngine;
    use crate::config::{PlaybackSettings, UiSettings};
    use crate::playlist::Playlist;
    use std::fs;

    fn session_in(dir: &Path) -> PlayerSession<ScriptedEngine> {
        let playlist = Playlist::new(scan(dir, &LibrarySettings::default()));
        PlayerSession::new(ScriptedEngine::new(), playlist, &PlaybackSettings::default())
    }

    fn touch(dir: &Path, names: &[&str]) {
        fs::create_dir_all(dir).unwrap();
        for name in names {
            fs::write(dir.join(name), b"not really audio").unwrap();
        }
    }

    #[test]
    fn change_folder_replaces_tracks_and_saves_state() {
        let root = tempfile::tempdir().unwrap();
        let old = root.path().join("old");
        let new = root.path().join("new");
        touch(&old, &["a.mp3"]);
        touch(&new, &["x.mp3", "y.flac", "notes.txt"]);
        let state_path = root.path().join("cfg").join("state.toml");

        let mut session = session_in(&old);
        session.play_index(0).unwrap();
        let mut app = App::new(old.clone(), &UiSettings::default());
        let mut state = LibraryState { folder: old };

        let found = change_folder(
            &mut session,
            &mut app,
            &mut state,
            Some(&state_path),
            new.clone(),
            &LibrarySettings::default(),
        )
        .unwrap();

        assert_eq!(found, 2);
        assert_eq!(session.playlist().len(), 2);
        assert!(session.playlist().position_of(&new.join("x.mp3")).is_some());
        // The old track keeps playing even though it left the list.
        assert_eq!(session.playback_state(), crate::tracker::PlaybackState::Playing);
        assert_eq!(app.folder, new);
        assert_eq!(LibraryState::load_from(&state_path).unwrap().folder, new);
    }

    #[test]
    fn change_folder_rejects_missing_folder_and_keeps_everything() {
        let root = tempfile::tempdir().unwrap();
        touch(root.path(), &["a.mp3"]);
        let state_path = root.path().join("state.toml");

        let mut session = session_in(root.path());
        let mut app = App::new(root.path().to_path_buf(), &UiSettings::default());
        let mut state = LibraryState {
            folder: root.path().to_path_buf(),
        };

        let err = change_folder(
            &mut session,
            &mut app,
            &mut state,
            Some(&state_path),
            root.path().join("gone"),
            &LibrarySettings::default(),
        )
        .unwrap_err();

        assert!(matches!(err, PlayerError::NotADirectory(_)));
        assert_eq!(session.playlist().len(), 1);
        assert_eq!(app.folder, root.path());
        assert!(!state_path.exists());
    }

    #[test]
    fn add_directory_appends_without_duplicates() {
        let root = tempfile::tempdir().unwrap();
        let lib = root.path().join("lib");
        let extra = root.path().join("extra");
        touch(&lib, &["a.mp3"]);
        touch(&extra, &["b.mp3", "c.ogg"]);

        let mut session = session_in(&lib);
        let mut app = App::new(lib.clone(), &UiSettings::default());
        let settings = LibrarySettings::default();

        assert_eq!(add_directory(&mut session, &mut app, &extra, &settings).unwrap(), 2);
        assert_eq!(add_directory(&mut session, &mut app, &extra, &settings).unwrap(), 0);
        assert_eq!(session.playlist().len(), 3);
        assert_eq!(app.folder, lib);
    }
}
