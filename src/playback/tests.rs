use super::*;
use crate::config::Settings;
use crate::error::GameError;
use crate::library::{SongQueue, Track, TrackSource};
use std::path::PathBuf;

fn local_settings() -> Settings {
    Settings::embedded_defaults().unwrap()
}

#[test]
fn track_info_copies_name_and_artist() {
    let track = Track {
        source: TrackSource::File(PathBuf::from("/music/song.mp3")),
        display_name: "Song".into(),
        artist: Some("Band".into()),
        sample_rate: Some(44_100),
    };
    assert_eq!(
        TrackInfo::from(&track),
        TrackInfo {
            name: "Song".into(),
            artist: Some("Band".into()),
        }
    );
}

#[test]
fn driver_for_picks_local_backend_by_default() {
    let driver = driver_for(&local_settings());
    assert_eq!(driver.kind(), BackendKind::LocalFile);
    assert!(driver.current_track_info().is_none());
}

#[test]
fn local_driver_ignores_out_of_order_controls() {
    let mut driver = LocalDriver::new();
    assert!(driver.pause().is_ok());
    assert!(driver.resume().is_ok());
    assert!(driver.stop().is_ok());
    assert!(driver.current_track_info().is_none());
}

#[test]
fn local_driver_refuses_remote_tracks() {
    let mut driver = LocalDriver::new();
    let err = driver
        .play(&Track::remote("spotify:track:1", "Remote", None))
        .unwrap_err();
    assert!(matches!(err, GameError::Unplayable(_)));
    assert!(driver.current_track_info().is_none());
}

#[test]
fn default_next_track_pops_the_queue() {
    let mut driver = LocalDriver::new();
    let mut queue = SongQueue::from_tracks(vec![Track::remote("uri:1", "Only", None)]);

    assert_eq!(driver.next_track(&mut queue).unwrap().display_name, "Only");
    assert!(matches!(
        driver.next_track(&mut queue),
        Err(GameError::EmptyQueue)
    ));
}

#[test]
fn remote_driver_does_not_scan_local_songs() {
    let mut settings = local_settings();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.mp3"), b"x").unwrap();
    settings.general.streaming_token_cache = dir.path().join("token.json");

    let mut driver = RemoteDriver::from_settings(&settings.general);
    let mut queue = SongQueue::from_tracks(vec![Track::remote("uri:1", "Stale", None)]);

    assert_eq!(driver.refill(&mut queue, dir.path(), &settings.library), 0);
    assert!(queue.is_empty());
    assert_eq!(driver.kind(), BackendKind::RemoteStream);
}

#[test]
fn remote_driver_without_token_cache_fails_as_backend_error() {
    let mut settings = local_settings();
    let dir = tempfile::tempdir().unwrap();
    settings.general.streaming_token_cache = dir.path().join("missing.json");

    let mut driver = RemoteDriver::from_settings(&settings.general);
    assert!(matches!(driver.silence(), Err(GameError::Backend(_))));

    // Controls that are out of order never reach the network.
    assert!(driver.pause().is_ok());
    assert!(driver.resume().is_ok());
    assert!(driver.stop().is_ok());
}

#[test]
fn local_requeue_returns_the_track_to_the_queue() {
    let mut driver = LocalDriver::new();
    let mut queue = SongQueue::new();
    driver.requeue(&mut queue, Track::remote("uri:1", "Again", None));
    assert_eq!(driver.next_track(&mut queue).unwrap().display_name, "Again");
}

#[test]
fn remote_requeue_leaves_the_local_queue_alone() {
    let mut settings = local_settings();
    let dir = tempfile::tempdir().unwrap();
    settings.general.streaming_token_cache = dir.path().join("token.json");

    let mut driver = RemoteDriver::from_settings(&settings.general);
    let mut queue = SongQueue::new();
    driver.requeue(&mut queue, Track::remote("uri:1", "Skipped", None));
    assert!(queue.is_empty());
}
