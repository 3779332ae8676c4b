//! Round state: playback status, clip timer, guess lock and team scores.
//!
//! `GameState` is a plain state machine with no I/O. The controller drives it
//! and talks to the playback backend.

mod state;
mod teams;

pub use state::*;
pub use teams::*;
