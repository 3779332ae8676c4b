use std::path::Path;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::LibrarySettings;
use crate::error::{GameError, Result};

use super::model::Track;
use super::scan::scan;

/// Shuffled, exhaustible sequence of tracks. Consumed from the back.
#[derive(Debug, Default)]
pub struct SongQueue {
    tracks: Vec<Track>,
}

impl SongQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a queue from already-loaded tracks, in the given order.
    #[cfg(test)]
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// Scan `dir`, shuffle the result and replace the current queue.
    ///
    /// Returns the number of tracks loaded; zero when `dir` is missing or has
    /// no songs.
    pub fn load(&mut self, dir: &Path, settings: &LibrarySettings) -> usize {
        self.load_with_rng(dir, settings, &mut rand::rng())
    }

    /// Same as [`SongQueue::load`] with a caller-provided random source.
    pub fn load_with_rng<R: Rng + ?Sized>(
        &mut self,
        dir: &Path,
        settings: &LibrarySettings,
        rng: &mut R,
    ) -> usize {
        let mut tracks = scan(dir, settings);
        tracks.shuffle(rng);
        self.tracks = tracks;

        if self.tracks.is_empty() {
            log::warn!("no songs found in {}", dir.display());
        } else {
            log::info!("loaded {} songs from {}", self.tracks.len(), dir.display());
        }
        self.tracks.len()
    }

    /// Remove and return the next track.
    pub fn pop_next(&mut self) -> Result<Track> {
        self.tracks.pop().ok_or(GameError::EmptyQueue)
    }

    /// Put `track` back so the next `pop_next` returns it again.
    pub fn requeue(&mut self, track: Track) {
        self.tracks.push(track);
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
