use std::path::Path;

use lofty::prelude::*;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::{Track, TrackSource};

fn is_song_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

/// Read name, artist and sample rate for one file. Unreadable tags are fine:
/// the file stem becomes the name.
fn read_track(path: &Path) -> Track {
    let mut display_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    let mut artist: Option<String> = None;
    let mut sample_rate: Option<u32> = None;

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            sample_rate = tagged.properties().sample_rate();

            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = tag.title() {
                    let v = v.trim();
                    if !v.is_empty() {
                        display_name = v.to_string();
                    }
                }
                if let Some(v) = tag.artist() {
                    let v = v.trim();
                    if !v.is_empty() {
                        artist = Some(v.to_string());
                    }
                }
            }
        }
        Err(e) => log::debug!("no metadata for {}: {e}", path.display()),
    }

    Track {
        source: TrackSource::File(path.to_path_buf()),
        display_name,
        artist,
        sample_rate,
    }
}

/// List the song files directly inside `dir` (no recursion).
///
/// A missing or unreadable directory yields an empty list; the caller treats
/// an empty library as something to tell the operator about.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    if !dir.is_dir() {
        log::warn!("songs directory {} does not exist", dir.display());
        return Vec::new();
    }

    let mut tracks: Vec<Track> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                log::warn!("skipping unreadable entry in {}: {err}", dir.display());
                None
            }
        })
        .filter(|e| e.path().is_file() && is_song_file(e.path(), settings))
        .map(|e| read_track(e.path()))
        .collect();

    // Directory order is platform dependent; sort so the shuffle is the only
    // source of randomness.
    tracks.sort_by(|a, b| {
        a.display_name
            .to_lowercase()
            .cmp(&b.display_name.to_lowercase())
    });
    tracks
}
