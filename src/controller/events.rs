use std::path::PathBuf;

use crate::game::{PlaybackStatus, Progress};
use crate::playback::TrackInfo;

/// Operator actions. Keys, MPRIS and tests all go through these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start the next clip.
    NextTrack,
    Pause,
    Resume,
    /// Pause when playing, resume when paused.
    TogglePause,
    /// Team (zero-based) pressed its buzzer.
    Buzz(usize),
    /// The guessing team answered correctly.
    Correct,
    /// The guessing team answered incorrectly.
    Incorrect,
    /// Rescan the songs directory and reshuffle.
    ReloadSongs,
    /// Switch to another songs directory and reload from it.
    SetSongsDirectory(PathBuf),
    /// Lengthen (positive) or shorten (negative) the clip, in seconds.
    AdjustPlaybackTime(i64),
}

/// State-change notifications published by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    TrackStarted(TrackInfo),
    StatusChanged(PlaybackStatus),
    Progress(Progress),
    Buzzed { team: usize },
    Scored { team: usize, score: i64 },
    QueueReloaded { tracks: usize },
    PlaybackTimeChanged { seconds: u64 },
    /// Something the operator should read (empty queue, backend failure).
    Notice(String),
}
