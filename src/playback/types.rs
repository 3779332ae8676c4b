//! Small types shared by the playback backends.

use std::fmt;

use crate::library::Track;

/// Which backend is active. Used for logging and the status line only.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BackendKind {
    LocalFile,
    RemoteStream,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LocalFile => "local files",
            Self::RemoteStream => "streaming service",
        })
    }
}

/// Display metadata for the loaded track.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackInfo {
    pub name: String,
    pub artist: Option<String>,
}

impl From<&Track> for TrackInfo {
    fn from(track: &Track) -> Self {
        Self {
            name: track.display_name.clone(),
            artist: track.artist.clone(),
        }
    }
}

/// What the driver believes the audio output is doing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum DriverState {
    #[default]
    Idle,
    Playing,
    Paused,
}
