use std::path::Path;

use crate::config::{LibrarySettings, Settings};
use crate::error::Result;
use crate::library::{SongQueue, Track};

use super::local::LocalDriver;
use super::remote::RemoteDriver;
use super::types::{BackendKind, TrackInfo};

/// Capability interface over an audio backend.
///
/// `pause`, `resume` and `stop` called in the wrong driver state are logged
/// as warnings and return `Ok(())`. Any call may fail with
/// [`GameError::Backend`](crate::error::GameError::Backend); the caller
/// decides whether to retry or tell the operator.
pub trait PlaybackDriver {
    fn kind(&self) -> BackendKind;

    /// Fill `queue` for a new round. By default scans `dir` and shuffles.
    fn refill(&mut self, queue: &mut SongQueue, dir: &Path, settings: &LibrarySettings) -> usize {
        queue.load(dir, settings)
    }

    /// Choose the track to play next. By default pops the local queue.
    fn next_track(&mut self, queue: &mut SongQueue) -> Result<Track> {
        queue.pop_next()
    }

    /// Hand back a track whose `play` failed for a reason other than the
    /// track itself, so it is tried again on the next "next".
    fn requeue(&mut self, queue: &mut SongQueue, track: Track) {
        queue.requeue(track);
    }

    /// Start audible playback of `track` from the beginning.
    fn play(&mut self, track: &Track) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    fn resume(&mut self) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    /// Name and artist of the loaded track, if any.
    fn current_track_info(&self) -> Option<TrackInfo>;
}

/// Build the backend selected by `settings.use_streaming_backend`.
pub fn driver_for(settings: &Settings) -> Box<dyn PlaybackDriver> {
    if settings.general.use_streaming_backend {
        let mut remote = RemoteDriver::from_settings(&settings.general);
        // Nothing should be audible before the first clip.
        if let Err(e) = remote.silence() {
            log::warn!("could not pause the streaming service at startup: {e}");
        }
        log::info!("using the streaming backend");
        Box::new(remote)
    } else {
        log::info!("using local files from {}", settings.general.songs_directory);
        Box::new(LocalDriver::new())
    }
}
