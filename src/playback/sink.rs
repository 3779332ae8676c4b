//! Opening and decoding a song file into a `rodio` sink.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, Sink};

use crate::error::{GameError, Result};

/// Create a paused `Sink` that will play `path` from the start.
pub(super) fn create_sink(stream: &OutputStream, path: &Path) -> Result<Sink> {
    let file = File::open(path)
        .map_err(|e| GameError::Unplayable(format!("{}: {e}", path.display())))?;

    let source = Decoder::new(BufReader::new(file))
        .map_err(|e| GameError::Unplayable(format!("{}: {e}", path.display())))?;

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}
