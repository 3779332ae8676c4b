//! Error taxonomy shared by the game, queue, playback and settings layers.
//!
//! Transition errors (`InvalidTransition`, `GuessLocked`, `InvalidTeam`) are
//! warnings: callers log and ignore them. `EmptyQueue`, `Backend` and
//! `Unplayable` are shown to the operator. `ConfigMissing` is fatal at startup.

use thiserror::Error;

use crate::game::PlaybackStatus;

#[derive(Error, Debug)]
pub enum GameError {
    /// No tracks left in the song queue.
    #[error("no songs left in the queue")]
    EmptyQueue,

    /// A command that is not valid in the current playback status.
    #[error("cannot {action} while {status}")]
    InvalidTransition {
        action: &'static str,
        status: PlaybackStatus,
    },

    /// A team buzzed in (or playback was resumed) while a guess is pending.
    #[error("a team is already guessing")]
    GuessLocked,

    /// Team index outside `0..teams`.
    #[error("team {index} does not exist (playing with {teams} teams)")]
    InvalidTeam { index: usize, teams: usize },

    /// A playback backend call failed.
    #[error("playback backend error: {0}")]
    Backend(String),

    /// The track itself cannot be played (missing file, undecodable audio).
    #[error("cannot play {0}")]
    Unplayable(String),

    /// A required setting is absent or malformed.
    #[error("configuration error: {0}")]
    ConfigMissing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GameError {
    /// True for errors that are logged as warnings and otherwise ignored.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransition { .. } | Self::GuessLocked | Self::InvalidTeam { .. }
        )
    }
}

impl From<::config::ConfigError> for GameError {
    fn from(e: ::config::ConfigError) -> Self {
        Self::ConfigMissing(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
