use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::{PlaybackEngine, RodioEngine, UnavailableEngine};
use crate::config::{self, LibraryState, resolve_state_path};
use crate::library::{scan, tracks_from_paths};
use crate::logging;
use crate::playlist::Playlist;
use crate::session::PlayerSession;
use crate::spectrum::{AudioCapture, SpectrumPipeline, SpectrumWorker};

mod event_loop;
mod folder;
mod settings;

/// Capture device plus the thread analyzing it.
pub(crate) struct Spectrum {
    capture: AudioCapture,
    worker: SpectrumWorker,
}

impl Spectrum {
    fn start(settings: &config::SpectrumSettings, gate: Arc<AtomicBool>) -> Option<Self> {
        let capture = match AudioCapture::open(settings.frame_size) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("{e}; spectrum disabled");
                return None;
            }
        };
        log::info!("capture running at {} Hz", capture.sample_rate());

        let worker = SpectrumWorker::spawn(
            capture.reader(),
            SpectrumPipeline::from_settings(settings),
            gate,
            Duration::from_millis(settings.interval_ms),
        );
        match worker {
            Ok(worker) => Some(Self { capture, worker }),
            Err(e) => {
                log::warn!("cannot start spectrum thread: {e}");
                None
            }
        }
    }

    pub(crate) fn worker(&self) -> &SpectrumWorker {
        &self.worker
    }

    fn shutdown(self) {
        self.capture.close();
        self.worker.join();
    }
}

/// Usage: `allegro [FOLDER] [FILE...]`. The folder is remembered for the next
/// start; extra files are added on top of the scanned library.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, settings_problem) = settings::load_settings();

    match logging::init(&settings.logging) {
        Ok(path) => log::info!("logging to {}", path.display()),
        Err(e) => eprintln!("allegro: logging disabled: {e}"),
    }
    if let Some(problem) = settings_problem {
        log::warn!("{problem}");
    }

    let mut args = env::args_os().skip(1);
    let mut state = LibraryState::load_or_default();
    if let Some(dir) = args.next().map(PathBuf::from) {
        if dir != state.folder {
            folder::remember_folder(&mut state, dir, resolve_state_path().as_deref());
        }
    }
    let extra: Vec<PathBuf> = args.map(PathBuf::from).collect();

    let mut playlist = Playlist::new(scan(&state.folder, &settings.library));
    playlist.add_tracks(tracks_from_paths(&extra, &settings.library));
    log::info!("{} tracks from {}", playlist.len(), state.folder.display());

    let mut app = App::new(state.folder.clone(), &settings.ui);

    let engine: Box<dyn PlaybackEngine> = match RodioEngine::open() {
        Ok(e) => Box::new(e),
        Err(e) => {
            log::error!("{e}; playback disabled");
            app.output_available = false;
            Box::new(UnavailableEngine::new(e.to_string()))
        }
    };
    let mut session = PlayerSession::new(engine, playlist, &settings.playback);

    let gate = Arc::new(AtomicBool::new(false));
    let spectrum = if settings.spectrum.enabled {
        Spectrum::start(&settings.spectrum, gate.clone())
    } else {
        None
    };
    app.spectrum_available = spectrum.is_some();

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
        &mut state,
        spectrum.as_ref(),
        &gate,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    session.stop();
    if let Some(spectrum) = spectrum {
        spectrum.shutdown();
    }
    log::info!("bye");

    run_result
}
