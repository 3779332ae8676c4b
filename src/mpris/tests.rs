use super::*;
use std::sync::mpsc;

fn handle_and_player() -> (MprisHandle, PlayerIface, mpsc::Receiver<ControlCmd>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    let handle = MprisHandle {
        state: state.clone(),
    };
    (handle, PlayerIface { tx, state }, rx)
}

#[test]
fn playback_status_follows_game_status() {
    let (handle, iface, _rx) = handle_and_player();
    assert_eq!(iface.playback_status(), "Stopped");

    handle.set_status(PlaybackStatus::Playing);
    assert_eq!(iface.playback_status(), "Playing");

    handle.set_status(PlaybackStatus::Paused);
    assert_eq!(iface.playback_status(), "Paused");
}

#[test]
fn now_playing_sets_and_clears_metadata() {
    let (handle, iface, _rx) = handle_and_player();

    handle.set_now_playing(Some(&TrackInfo {
        name: "Waterloo".into(),
        artist: Some("ABBA".into()),
    }));
    let md = iface.metadata();
    assert!(md.contains_key("xesam:title"));
    assert!(md.contains_key("xesam:artist"));
    assert!(md.contains_key("mpris:trackid"));

    handle.set_now_playing(None);
    let md = iface.metadata();
    assert!(md.contains_key("xesam:title"));
    assert!(!md.contains_key("xesam:artist"));
    assert!(!md.contains_key("mpris:trackid"));
    {
        let s = handle.state.lock().unwrap();
        assert_eq!(s.title, None);
        assert_eq!(s.artist, None);
    }
}

#[test]
fn player_methods_forward_commands() {
    let (_handle, iface, rx) = handle_and_player();
    iface.play_pause();
    iface.next();
    iface.play();
    iface.pause();

    let got: Vec<ControlCmd> = rx.try_iter().collect();
    assert_eq!(
        got,
        vec![
            ControlCmd::PlayPause,
            ControlCmd::Next,
            ControlCmd::Play,
            ControlCmd::Pause,
        ]
    );
}

#[test]
fn root_quit_forwards_quit() {
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    let root = RootIface { tx };
    root.quit();
    assert_eq!(rx.try_recv().unwrap(), ControlCmd::Quit);
    assert_eq!(root.identity(), "buzzquiz");
}

#[test]
fn commands_after_shutdown_are_dropped() {
    let (_handle, iface, rx) = handle_and_player();
    drop(rx);
    iface.next();
    iface.play_pause();
}

#[test]
fn status_names_match_mpris() {
    let mut state = SharedState::default();
    assert_eq!(state.status_name(), "Stopped");
    state.status = PlaybackStatus::Paused;
    assert_eq!(state.status_name(), "Paused");
}
