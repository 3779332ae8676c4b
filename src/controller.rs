//! The game controller: the single owner and mutator of round state.
//!
//! The UI and MPRIS only send [`Command`]s and read state back through the
//! accessors or a [`GameEvent`] subscription. Backend failures are caught
//! here, logged, and turned into operator notices; the state machine is only
//! advanced after the backend call succeeded.

mod events;

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use crate::config::{LibrarySettings, Settings};
use crate::error::{GameError, Result};
use crate::game::{GameState, PlaybackStatus, Progress};
use crate::library::SongQueue;
use crate::playback::{BackendKind, PlaybackDriver, TrackInfo};

pub use events::{Command, GameEvent};

pub struct Controller {
    game: GameState,
    queue: SongQueue,
    driver: Box<dyn PlaybackDriver>,
    songs_dir: PathBuf,
    library: LibrarySettings,
    subscribers: Vec<Sender<GameEvent>>,
}

impl Controller {
    pub fn new(settings: &Settings, driver: Box<dyn PlaybackDriver>) -> Self {
        Self {
            game: GameState::from_settings(settings),
            queue: SongQueue::new(),
            driver,
            songs_dir: PathBuf::from(&settings.general.songs_directory),
            library: settings.library.clone(),
            subscribers: Vec::new(),
        }
    }

    /// Receive every event published from now on.
    pub fn subscribe(&mut self) -> Receiver<GameEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn publish(&mut self, event: GameEvent) {
        // Drop subscribers that went away.
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn backend(&self) -> BackendKind {
        self.driver.kind()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn songs_directory(&self) -> &Path {
        &self.songs_dir
    }

    pub fn playback_time_secs(&self) -> u64 {
        self.game.duration_secs()
    }

    /// What the backend says is loaded, falling back to the queued track.
    pub fn now_playing(&self) -> Option<TrackInfo> {
        self.driver
            .current_track_info()
            .or_else(|| self.game.current_track().map(TrackInfo::from))
    }

    /// "Next" is offered once the clip is no longer playing and no team is guessing.
    pub fn can_start_next(&self) -> bool {
        self.game.status() != PlaybackStatus::Playing && !self.game.is_guess_locked()
    }

    /// Run `cmd`, logging warnings and publishing a notice for errors the
    /// operator has to see. Never fails.
    pub fn handle(&mut self, cmd: Command) {
        let Err(e) = self.execute(cmd.clone()) else {
            return;
        };

        if e.is_warning() {
            log::warn!("{cmd:?} ignored: {e}");
            return;
        }

        match e {
            GameError::EmptyQueue => {
                log::warn!("no songs loaded");
                self.publish(GameEvent::Notice(
                    "No songs left. Press r to reload the songs directory.".to_string(),
                ));
            }
            other => {
                log::error!("{cmd:?} failed: {other}");
                self.publish(GameEvent::Notice(other.to_string()));
            }
        }
    }

    pub fn execute(&mut self, cmd: Command) -> Result<()> {
        match cmd {
            Command::NextTrack => self.start_next_track(),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::TogglePause => self.toggle_pause(),
            Command::Buzz(team) => self.buzz_in(team),
            Command::Correct => self.resolve_guess(true),
            Command::Incorrect => self.resolve_guess(false),
            Command::ReloadSongs => {
                self.reload_songs();
                Ok(())
            }
            Command::SetSongsDirectory(dir) => {
                self.change_songs_directory(dir);
                Ok(())
            }
            Command::AdjustPlaybackTime(delta) => {
                let secs = self.playback_time_secs().saturating_add_signed(delta).max(1);
                self.set_playback_time(secs);
                Ok(())
            }
        }
    }

    /// Pick the next track through the backend and start playing it.
    ///
    /// Refused while the clip is playing or a guess is pending, the same
    /// moments the board disables its "next" key.
    pub fn start_next_track(&mut self) -> Result<()> {
        if self.game.status() == PlaybackStatus::Playing {
            return Err(GameError::InvalidTransition {
                action: "skip to the next song",
                status: PlaybackStatus::Playing,
            });
        }
        if self.game.is_guess_locked() {
            return Err(GameError::GuessLocked);
        }

        let track = self.driver.next_track(&mut self.queue)?;
        if let Err(e) = self.driver.play(&track) {
            if matches!(e, GameError::Unplayable(_)) {
                log::warn!("dropping {}: {e}", track.display_name);
            } else {
                log::warn!("{} back in the queue after: {e}", track.display_name);
                self.driver.requeue(&mut self.queue, track);
            }
            return Err(e);
        }

        let info = self
            .driver
            .current_track_info()
            .unwrap_or_else(|| TrackInfo::from(&track));
        log::info!("started {}", info.name);

        self.game.start_track(track);
        self.publish(GameEvent::TrackStarted(info));
        self.publish(GameEvent::StatusChanged(PlaybackStatus::Playing));
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        if self.game.status() != PlaybackStatus::Playing {
            return Err(GameError::InvalidTransition {
                action: "pause",
                status: self.game.status(),
            });
        }
        self.driver.pause()?;
        self.game.pause()?;
        self.publish(GameEvent::StatusChanged(PlaybackStatus::Paused));
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        if self.game.is_guess_locked() {
            return Err(GameError::GuessLocked);
        }
        if self.game.status() != PlaybackStatus::Paused {
            return Err(GameError::InvalidTransition {
                action: "resume",
                status: self.game.status(),
            });
        }
        self.driver.resume()?;
        self.game.resume()?;
        self.publish(GameEvent::StatusChanged(PlaybackStatus::Playing));
        Ok(())
    }

    pub fn toggle_pause(&mut self) -> Result<()> {
        match self.game.status() {
            PlaybackStatus::Playing => self.pause(),
            PlaybackStatus::Paused => self.resume(),
            PlaybackStatus::Stopped => Err(GameError::InvalidTransition {
                action: "pause or resume",
                status: PlaybackStatus::Stopped,
            }),
        }
    }

    /// Lock guessing to `team` and pause the clip.
    ///
    /// A buzz is never lost: if the backend cannot pause, the failure is
    /// reported but the lock is still taken and the timer stops.
    pub fn buzz_in(&mut self, team: usize) -> Result<()> {
        self.game.check_buzz(team)?;

        let was_playing = self.game.status() == PlaybackStatus::Playing;
        if was_playing {
            if let Err(e) = self.driver.pause() {
                log::error!("backend did not pause on buzz-in: {e}");
                self.publish(GameEvent::Notice(e.to_string()));
            }
        }

        self.game.buzz_in(team)?;
        log::info!("team {} buzzed in", team + 1);

        self.publish(GameEvent::Buzzed { team });
        if was_playing {
            self.publish(GameEvent::StatusChanged(PlaybackStatus::Paused));
        }
        Ok(())
    }

    /// Score the pending guess. Without a pending guess this does nothing.
    pub fn resolve_guess(&mut self, correct: bool) -> Result<()> {
        match self.game.resolve_guess(correct) {
            Some((team, score)) => {
                log::info!(
                    "team {} answered {}, score now {score}",
                    team + 1,
                    if correct { "correctly" } else { "incorrectly" }
                );
                self.publish(GameEvent::Scored { team, score });
            }
            None => log::debug!("no team is guessing"),
        }
        Ok(())
    }

    /// Advance the clip timer; stops the backend when the clip is over.
    pub fn tick(&mut self, delta_ms: u64) -> Result<Progress> {
        let progress = self.game.tick(delta_ms)?;
        self.publish(GameEvent::Progress(progress));

        if progress.finished {
            if let Err(e) = self.driver.stop() {
                log::error!("backend did not stop at end of clip: {e}");
                self.publish(GameEvent::Notice(e.to_string()));
            }
            self.publish(GameEvent::StatusChanged(PlaybackStatus::Stopped));
        }
        Ok(progress)
    }

    /// Rescan the songs directory (through the backend) and reshuffle.
    pub fn reload_songs(&mut self) -> usize {
        let tracks = self
            .driver
            .refill(&mut self.queue, &self.songs_dir, &self.library);
        self.publish(GameEvent::QueueReloaded { tracks });
        tracks
    }

    pub fn set_songs_directory(&mut self, dir: impl Into<PathBuf>) {
        self.songs_dir = dir.into();
    }

    /// Point the library at `dir` and reload the queue from it.
    pub fn change_songs_directory(&mut self, dir: impl Into<PathBuf>) -> usize {
        self.set_songs_directory(dir);
        log::info!("songs directory set to {}", self.songs_dir.display());
        self.reload_songs()
    }

    pub fn set_playback_time(&mut self, secs: u64) {
        self.game.set_duration_secs(secs);
        let seconds = self.game.duration_secs();
        log::info!("playback time set to {seconds}s");
        self.publish(GameEvent::PlaybackTimeChanged { seconds });
    }
}
