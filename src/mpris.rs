//! MPRIS surface so media keys and `playerctl` can drive the quiz.
//!
//! Runs on its own thread; commands go back to the event loop over an mpsc
//! channel and the loop pushes status and title into a shared snapshot.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};
use std::time::Duration;

use async_io::{Timer, block_on};
use zbus::{Connection, connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::game::PlaybackStatus;
use crate::playback::TrackInfo;

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.buzzquiz";
const TRACK_ID: &str = "/org/buzzquiz/clip";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Next,
}

/// What the bus sees of the game, refreshed by the event loop.
#[derive(Debug, Default)]
struct SharedState {
    status: PlaybackStatus,
    title: Option<String>,
    artist: Option<String>,
}

impl SharedState {
    fn status_name(&self) -> &'static str {
        match self.status {
            PlaybackStatus::Stopped => "Stopped",
            PlaybackStatus::Playing => "Playing",
            PlaybackStatus::Paused => "Paused",
        }
    }

    /// `xesam:title` is always present (empty between clips) so clients
    /// clear their display.
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut entries: Vec<(&str, Value<'_>)> = vec![(
            "xesam:title",
            Value::from(self.title.clone().unwrap_or_default()),
        )];
        if self.title.is_some() {
            if let Ok(path) = ObjectPath::try_from(TRACK_ID) {
                entries.push(("mpris:trackid", Value::from(path)));
            }
        }
        if let Some(artist) = &self.artist {
            entries.push(("xesam:artist", Value::from(vec![artist.clone()])));
        }

        entries
            .into_iter()
            .filter_map(|(key, value)| {
                OwnedValue::try_from(value)
                    .ok()
                    .map(|v| (key.to_string(), v))
            })
            .collect()
    }
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    pub fn set_status(&self, status: PlaybackStatus) {
        if let Ok(mut s) = self.state.lock() {
            s.status = status;
        }
    }

    pub fn set_now_playing(&self, info: Option<&TrackInfo>) {
        if let Ok(mut s) = self.state.lock() {
            s.title = info.map(|i| i.name.clone());
            s.artist = info.and_then(|i| i.artist.clone());
        }
    }
}

/// Hand `cmd` to the event loop. A closed channel means the quiz is exiting.
fn forward(tx: &Sender<ControlCmd>, cmd: ControlCmd) {
    if tx.send(cmd).is_err() {
        log::debug!("MPRIS: {cmd:?} arrived after shutdown");
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {}

    fn quit(&self) {
        forward(&self.tx, ControlCmd::Quit);
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "buzzquiz"
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        forward(&self.tx, ControlCmd::Next);
    }

    fn play(&self) {
        forward(&self.tx, ControlCmd::Play);
    }

    fn pause(&self) {
        forward(&self.tx, ControlCmd::Pause);
    }

    fn play_pause(&self) {
        forward(&self.tx, ControlCmd::PlayPause);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        self.state
            .lock()
            .map(|s| s.status_name())
            .unwrap_or("Stopped")
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        self.state
            .lock()
            .map(|s| s.metadata())
            .unwrap_or_default()
    }

    /// Previous, seek and the rest stay disabled; a quiz only moves forward.
    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }
}

/// Claim the bus name and export both interfaces.
async fn serve(tx: Sender<ControlCmd>, state: Arc<Mutex<SharedState>>) -> zbus::Result<Connection> {
    connection::Builder::session()?
        .name(BUS_NAME)?
        .serve_at(OBJECT_PATH, RootIface { tx: tx.clone() })?
        .serve_at(OBJECT_PATH, PlayerIface { tx, state })?
        .build()
        .await
}

/// Serve MPRIS on the session bus. Bus failures are logged and the quiz
/// carries on without remote control.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));

    let shared = state.clone();
    std::thread::spawn(move || {
        block_on(async move {
            // The connection must stay alive for the interfaces to answer.
            let _connection = match serve(tx, shared).await {
                Ok(c) => c,
                Err(e) => {
                    log::warn!("MPRIS unavailable: {e}");
                    return;
                }
            };
            log::info!("MPRIS: serving {BUS_NAME}");
            loop {
                Timer::after(Duration::from_secs(3600)).await;
            }
        });
    });

    MprisHandle { state }
}

#[cfg(test)]
mod tests;
