use std::path::PathBuf;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::controller::Controller;
use crate::mpris::ControlCmd;
use crate::playback::driver_for;

mod event_loop;
mod mpris_sync;
mod settings;

/// Command-line overrides for one session.
#[derive(Debug, Default)]
pub struct Options {
    /// Override settings file (also the write-back target).
    pub config: Option<PathBuf>,
    /// Base settings file instead of the embedded defaults.
    pub defaults: Option<PathBuf>,
    /// Songs directory for this session.
    pub songs: Option<PathBuf>,
}

pub fn run(options: Options) -> anyhow::Result<()> {
    let (mut settings, sources) =
        settings::load_settings(options.defaults, options.config, options.songs)?;

    let driver = driver_for(&settings);
    let mut controller = Controller::new(&settings, driver);
    let events = controller.subscribe();
    let loaded = controller.reload_songs();
    log::info!(
        "{} backend ready, {loaded} songs queued",
        controller.backend()
    );

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = {
        let mut state = event_loop::EventLoopState::new();
        event_loop::run(
            &mut terminal,
            &mut controller,
            &events,
            &control_rx,
            &mpris,
            &mut state,
        )
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    settings::write_back(&mut settings, &sources, &controller);
    log::info!("session over");

    run_result
}
