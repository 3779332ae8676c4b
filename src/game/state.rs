use std::fmt;

use crate::config::Settings;
use crate::error::{GameError, Result};
use crate::library::Track;

use super::teams::Teams;

/// Playback status of the current clip.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
        })
    }
}

/// Points awarded when a guess is resolved.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Scoring {
    pub points_correct: i64,
    pub points_incorrect: i64,
}

/// How far into the clip we are.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Progress {
    pub elapsed_ms: u64,
    /// `elapsed / duration`, clamped to `[0, 1]`.
    pub fraction: f64,
    /// True on the tick that reached the clip length.
    pub finished: bool,
}

/// State machine for one round: `Stopped -> Playing <-> Paused`, and
/// `Playing -> Stopped` when the clip length is reached.
///
/// The guess lock is held exactly when `guessing_team` is set.
#[derive(Debug, Clone)]
pub struct GameState {
    status: PlaybackStatus,
    elapsed_ms: u64,
    duration_ms: u64,
    guessing_team: Option<usize>,
    current: Option<Track>,
    teams: Teams,
    scoring: Scoring,
}

impl GameState {
    pub fn new(teams: Teams, scoring: Scoring, playback_time_secs: u64) -> Self {
        Self {
            status: PlaybackStatus::Stopped,
            elapsed_ms: 0,
            duration_ms: secs_to_ms(playback_time_secs),
            guessing_team: None,
            current: None,
            teams,
            scoring,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Teams::from_settings(settings),
            Scoring {
                points_correct: settings.rules.points_correct,
                points_incorrect: settings.rules.points_incorrect,
            },
            settings.rules.playback_time_seconds,
        )
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn guessing_team(&self) -> Option<usize> {
        self.guessing_team
    }

    pub fn is_guess_locked(&self) -> bool {
        self.guessing_team.is_some()
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn teams(&self) -> &Teams {
        &self.teams
    }

    pub fn progress(&self) -> Progress {
        Progress {
            elapsed_ms: self.elapsed_ms,
            fraction: fraction(self.elapsed_ms, self.duration_ms),
            finished: self.status == PlaybackStatus::Stopped && self.elapsed_ms >= self.duration_ms,
        }
    }

    /// Begin a new clip: timer to zero, status Playing, guess lock cleared.
    pub fn start_track(&mut self, track: Track) {
        self.current = Some(track);
        self.elapsed_ms = 0;
        self.status = PlaybackStatus::Playing;
        self.guessing_team = None;
    }

    /// Advance the clip timer. Only valid while Playing.
    pub fn tick(&mut self, delta_ms: u64) -> Result<Progress> {
        if self.status != PlaybackStatus::Playing {
            return Err(GameError::InvalidTransition {
                action: "advance the timer",
                status: self.status,
            });
        }

        // Never past the clip length, and never backwards if the length shrank.
        self.elapsed_ms = self
            .elapsed_ms
            .saturating_add(delta_ms)
            .min(self.duration_ms)
            .max(self.elapsed_ms);

        let finished = self.elapsed_ms >= self.duration_ms;
        if finished {
            self.status = PlaybackStatus::Stopped;
        }

        Ok(Progress {
            elapsed_ms: self.elapsed_ms,
            fraction: fraction(self.elapsed_ms, self.duration_ms),
            finished,
        })
    }

    pub fn pause(&mut self) -> Result<()> {
        if self.status != PlaybackStatus::Playing {
            return Err(GameError::InvalidTransition {
                action: "pause",
                status: self.status,
            });
        }
        self.status = PlaybackStatus::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        if self.status != PlaybackStatus::Paused {
            return Err(GameError::InvalidTransition {
                action: "resume",
                status: self.status,
            });
        }
        self.status = PlaybackStatus::Playing;
        Ok(())
    }

    /// Check that `team` may buzz in right now, without changing anything.
    pub fn check_buzz(&self, team: usize) -> Result<()> {
        if self.is_guess_locked() {
            return Err(GameError::GuessLocked);
        }
        if team >= self.teams.len() {
            return Err(GameError::InvalidTeam {
                index: team,
                teams: self.teams.len(),
            });
        }
        Ok(())
    }

    /// Lock guessing to `team`, pausing the clip if it is playing.
    pub fn buzz_in(&mut self, team: usize) -> Result<()> {
        self.check_buzz(team)?;
        if self.status == PlaybackStatus::Playing {
            self.status = PlaybackStatus::Paused;
        }
        self.guessing_team = Some(team);
        Ok(())
    }

    /// Score the pending guess and release the lock.
    ///
    /// Returns the team and its new score, or `None` when nobody is guessing.
    /// Playback stays paused.
    pub fn resolve_guess(&mut self, correct: bool) -> Option<(usize, i64)> {
        let team = self.guessing_team.take()?;
        let points = if correct {
            self.scoring.points_correct
        } else {
            self.scoring.points_incorrect
        };
        let score = self.teams.add_points(team, points)?;
        Some((team, score))
    }

    /// Change the clip length. Values below one second are raised to one.
    pub fn set_duration_secs(&mut self, secs: u64) {
        self.duration_ms = secs_to_ms(secs);
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_ms / 1000
    }
}

fn secs_to_ms(secs: u64) -> u64 {
    secs.max(1).saturating_mul(1000)
}

fn fraction(elapsed_ms: u64, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 1.0;
    }
    (elapsed_ms as f64 / duration_ms as f64).clamp(0.0, 1.0)
}

/// Format elapsed time as `MM:SS`.
pub fn format_timer(elapsed_ms: u64) -> String {
    let secs = elapsed_ms / 1000;
    format!("{:02}:{:02}", (secs / 60) % 60, secs % 60)
}
