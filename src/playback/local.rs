use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::error::{GameError, Result};
use crate::library::{Track, TrackSource};

use super::driver::PlaybackDriver;
use super::sink::create_sink;
use super::types::{BackendKind, DriverState, TrackInfo};

/// Plays song files through the default audio output.
///
/// The output stream is opened on the first `play`, so a machine without an
/// audio device can still start the board and use the streaming backend.
#[derive(Default)]
pub struct LocalDriver {
    stream: Option<OutputStream>,
    sink: Option<Sink>,
    state: DriverState,
    current: Option<TrackInfo>,
}

impl LocalDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn output(&mut self) -> Result<&OutputStream> {
        if self.stream.is_none() {
            let mut stream = OutputStreamBuilder::open_default_stream()
                .map_err(|e| GameError::Backend(format!("no audio output device: {e}")))?;
            // rodio logs to stderr when the stream is dropped, which would
            // draw over the board.
            stream.log_on_drop(false);
            self.stream = Some(stream);
        }
        self.stream
            .as_ref()
            .ok_or_else(|| GameError::Backend("audio output is not open".to_string()))
    }
}

impl PlaybackDriver for LocalDriver {
    fn kind(&self) -> BackendKind {
        BackendKind::LocalFile
    }

    fn play(&mut self, track: &Track) -> Result<()> {
        let TrackSource::File(path) = &track.source else {
            return Err(GameError::Unplayable(format!(
                "{}: not a local file",
                track.display_name
            )));
        };

        let sink = {
            let stream = self.output()?;
            create_sink(stream, path)?
        };

        if let Some(old) = self.sink.take() {
            old.stop();
        }

        sink.play();
        self.sink = Some(sink);
        self.state = DriverState::Playing;
        self.current = Some(TrackInfo::from(track));

        log::info!(
            "playing {} ({} Hz)",
            path.display(),
            track
                .sample_rate
                .map(|r| r.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        );
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        match (&self.sink, self.state) {
            (Some(sink), DriverState::Playing) => {
                sink.pause();
                self.state = DriverState::Paused;
            }
            _ => log::warn!("pause ignored: song is not playing"),
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        match (&self.sink, self.state) {
            (Some(sink), DriverState::Paused) => {
                sink.play();
                self.state = DriverState::Playing;
            }
            _ => log::warn!("resume ignored: song is not paused"),
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        match self.sink.take() {
            Some(sink) => {
                sink.stop();
                self.state = DriverState::Idle;
            }
            None => log::warn!("stop ignored: nothing loaded"),
        }
        Ok(())
    }

    fn current_track_info(&self) -> Option<TrackInfo> {
        self.current.clone()
    }
}
