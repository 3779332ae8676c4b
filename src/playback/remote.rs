use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;
use ureq::Agent;

use crate::config::{GeneralSettings, LibrarySettings};
use crate::error::{GameError, Result};
use crate::library::{SongQueue, Track};

use super::driver::PlaybackDriver;
use super::token::TokenStore;
use super::types::{BackendKind, DriverState, TrackInfo};

const API_BASE: &str = "https://api.spotify.com/v1";

/// Upper bound for any single HTTP call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
/// How long to wait for the service to report the track after a skip.
const READY_TIMEOUT: Duration = Duration::from_secs(3);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Deserialize)]
struct CurrentlyPlaying {
    item: Option<Item>,
    #[serde(default)]
    is_playing: bool,
}

#[derive(Debug, Deserialize)]
struct Item {
    uri: String,
    name: String,
    #[serde(default)]
    artists: Vec<Artist>,
}

#[derive(Debug, Deserialize)]
struct Artist {
    name: String,
}

/// The service's view of the current track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RemoteItem {
    pub uri: String,
    pub name: String,
    pub artist: Option<String>,
    pub is_playing: bool,
}

impl CurrentlyPlaying {
    fn into_item(self) -> Option<RemoteItem> {
        let is_playing = self.is_playing;
        self.item.map(|item| RemoteItem {
            artist: join_artists(&item.artists),
            uri: item.uri,
            name: item.name,
            is_playing,
        })
    }
}

/// `"A, B, C"`, or `None` when the list is empty.
fn join_artists(artists: &[Artist]) -> Option<String> {
    let names: Vec<&str> = artists
        .iter()
        .map(|a| a.name.trim())
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}

/// Poll `fetch` until it reports an item other than `previous`.
///
/// Fails with `Backend` once `timeout` has passed, instead of handing back
/// whatever the service reported last.
pub(crate) fn wait_for_new_item<F>(
    previous: Option<&str>,
    timeout: Duration,
    interval: Duration,
    mut fetch: F,
) -> Result<RemoteItem>
where
    F: FnMut() -> Result<Option<RemoteItem>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(item) = fetch()? {
            if previous != Some(item.uri.as_str()) {
                return Ok(item);
            }
        }
        if Instant::now() >= deadline {
            return Err(GameError::Backend(format!(
                "streaming service did not report a new track within {} ms",
                timeout.as_millis()
            )));
        }
        thread::sleep(interval);
    }
}

#[derive(Copy, Clone)]
enum Verb {
    Put,
    Post,
}

/// Remote-controls playback on a streaming service account.
///
/// The service owns the play queue; the local song queue is not used.
pub struct RemoteDriver {
    agent: Agent,
    tokens: TokenStore,
    state: DriverState,
    current: Option<TrackInfo>,
    current_uri: Option<String>,
    service_playing: bool,
}

impl RemoteDriver {
    pub fn from_settings(general: &GeneralSettings) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build()
            .into();

        Self {
            agent,
            tokens: TokenStore::new(
                general.streaming_token_cache.clone(),
                general.streaming_client_id.clone(),
                general.streaming_client_secret.clone(),
            ),
            state: DriverState::Idle,
            current: None,
            current_uri: None,
            service_playing: false,
        }
    }

    /// Pause the service whatever its state; used once at startup.
    pub fn silence(&mut self) -> Result<()> {
        self.command(Verb::Put, "/me/player/pause")
    }

    fn command(&mut self, verb: Verb, path: &str) -> Result<()> {
        let url = format!("{API_BASE}{path}");
        let auth = format!("Bearer {}", self.tokens.access_token(&self.agent)?);

        let result = match verb {
            Verb::Put => self.agent.put(&url).header("Authorization", &auth).send_empty(),
            Verb::Post => self.agent.post(&url).header("Authorization", &auth).send_empty(),
        };
        result
            .map(|_| ())
            .map_err(|e| GameError::Backend(format!("{path}: {e}")))
    }

    fn currently_playing(&mut self) -> Result<Option<RemoteItem>> {
        let url = format!("{API_BASE}/me/player/currently-playing");
        let auth = format!("Bearer {}", self.tokens.access_token(&self.agent)?);

        let mut response = self
            .agent
            .get(&url)
            .header("Authorization", &auth)
            .call()
            .map_err(|e| GameError::Backend(format!("currently-playing: {e}")))?;

        // 204: nothing is loaded on the account.
        if response.status().as_u16() == 204 {
            return Ok(None);
        }

        let body: CurrentlyPlaying = response
            .body_mut()
            .read_json()
            .map_err(|e| GameError::Backend(format!("currently-playing returned bad JSON: {e}")))?;
        Ok(body.into_item())
    }
}

impl PlaybackDriver for RemoteDriver {
    fn kind(&self) -> BackendKind {
        BackendKind::RemoteStream
    }

    fn refill(
        &mut self,
        queue: &mut SongQueue,
        _dir: &Path,
        _settings: &LibrarySettings,
    ) -> usize {
        queue.clear();
        log::debug!("streaming backend plays from the service queue; local library not scanned");
        0
    }

    fn next_track(&mut self, _queue: &mut SongQueue) -> Result<Track> {
        let previous = match self.current_uri.clone() {
            Some(uri) => Some(uri),
            None => self.currently_playing()?.map(|item| item.uri),
        };

        self.command(Verb::Post, "/me/player/next")?;

        let item = wait_for_new_item(previous.as_deref(), READY_TIMEOUT, POLL_INTERVAL, || {
            self.currently_playing()
        })?;

        log::info!(
            "streaming service moved to {} ({})",
            item.name,
            item.artist.as_deref().unwrap_or("unknown artist")
        );

        self.current_uri = Some(item.uri.clone());
        self.service_playing = item.is_playing;
        self.current = Some(TrackInfo {
            name: item.name.clone(),
            artist: item.artist.clone(),
        });
        Ok(Track::remote(item.uri, item.name, item.artist))
    }

    fn requeue(&mut self, _queue: &mut SongQueue, track: Track) {
        // The service keeps its own queue; a skipped item is not replayed.
        log::debug!("not requeueing {}", track.display_name);
    }

    fn play(&mut self, track: &Track) -> Result<()> {
        self.command(Verb::Put, "/me/player/seek?position_ms=0")?;
        if !self.service_playing {
            self.command(Verb::Put, "/me/player/play")?;
        }
        self.service_playing = true;
        self.state = DriverState::Playing;
        self.current = Some(TrackInfo::from(track));
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        if self.state != DriverState::Playing {
            log::warn!("pause ignored: song is not playing");
            return Ok(());
        }
        self.command(Verb::Put, "/me/player/pause")?;
        self.service_playing = false;
        self.state = DriverState::Paused;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        if self.state != DriverState::Paused {
            log::warn!("resume ignored: song is not paused");
            return Ok(());
        }
        self.command(Verb::Put, "/me/player/play")?;
        self.service_playing = true;
        self.state = DriverState::Playing;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.state == DriverState::Idle {
            log::warn!("stop ignored: nothing loaded");
            return Ok(());
        }
        // The service has no stop; a paused player is silent.
        if self.state == DriverState::Playing {
            self.command(Verb::Put, "/me/player/pause")?;
        }
        self.service_playing = false;
        self.state = DriverState::Idle;
        Ok(())
    }

    fn current_track_info(&self) -> Option<TrackInfo> {
        self.current.clone()
    }
}
