use std::path::PathBuf;

/// Where a track's audio comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrackSource {
    /// A file in the songs directory.
    File(PathBuf),
    /// An item reported by the streaming service (its URI).
    Remote(String),
}

/// A playable song. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Track {
    pub source: TrackSource,
    pub display_name: String,
    pub artist: Option<String>,
    /// Native sample rate, read from the file header (local files only).
    pub sample_rate: Option<u32>,
}

impl Track {
    pub fn remote(uri: impl Into<String>, name: impl Into<String>, artist: Option<String>) -> Self {
        Self {
            source: TrackSource::Remote(uri.into()),
            display_name: name.into(),
            artist,
            sample_rate: None,
        }
    }
}
