//! Playback backends behind one capability trait.
//!
//! `LocalDriver` plays files from the songs directory through `rodio`;
//! `RemoteDriver` remote-controls a streaming service account. The backend is
//! picked once at startup by [`driver_for`].

mod driver;
mod local;
mod remote;
mod sink;
mod token;
mod types;

pub use driver::{PlaybackDriver, driver_for};
pub use local::LocalDriver;
pub use remote::RemoteDriver;
pub use types::*;

#[cfg(test)]
mod tests;
