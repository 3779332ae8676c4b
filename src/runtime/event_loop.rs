use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::controller::{Command, Controller, GameEvent};
use crate::game::PlaybackStatus;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::playback::BackendKind;
use crate::runtime::mpris_sync::update_mpris;
use crate::ui;

const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Seconds added or removed by `+` and `-`.
const PLAYBACK_TIME_STEP: i64 = 5;

/// What an input asks the loop to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Run(Command),
    /// Open the songs directory prompt.
    EditSongsDirectory,
}

/// Turns measured wall-clock time into whole-millisecond ticks.
///
/// The sub-millisecond remainder is carried to the next tick so no time is
/// lost to rounding. Time spent while not playing is discarded.
#[derive(Debug)]
pub struct Clock {
    last: Instant,
    carry: Duration,
}

impl Clock {
    pub fn new(now: Instant) -> Self {
        Self {
            last: now,
            carry: Duration::ZERO,
        }
    }

    /// Milliseconds to feed to the timer at `now`; zero when not `playing`.
    pub fn advance(&mut self, now: Instant, playing: bool) -> u64 {
        let since = now.saturating_duration_since(self.last);
        self.last = now;

        if !playing {
            self.carry = Duration::ZERO;
            return 0;
        }

        let total = since + self.carry;
        let ms = total.as_millis().min(u128::from(u64::MAX)) as u64;
        self.carry = total - Duration::from_millis(ms);
        ms
    }

    /// Forget the time since the last sample.
    pub fn restart(&mut self, now: Instant) {
        self.last = now;
    }
}

/// Result of a key press while the directory prompt is open.
#[derive(Debug, PartialEq, Eq)]
pub enum PromptOutcome {
    Editing,
    Cancel,
    Submit(PathBuf),
}

/// Edit the prompt `text` with `key`.
pub fn prompt_key(text: &mut String, key: KeyEvent) -> PromptOutcome {
    match key.code {
        KeyCode::Esc => PromptOutcome::Cancel,
        KeyCode::Enter => {
            let dir = text.trim();
            if dir.is_empty() {
                PromptOutcome::Cancel
            } else {
                PromptOutcome::Submit(PathBuf::from(dir))
            }
        }
        KeyCode::Backspace => {
            text.pop();
            PromptOutcome::Editing
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            PromptOutcome::Cancel
        }
        KeyCode::Char(c) => {
            text.push(c);
            PromptOutcome::Editing
        }
        _ => PromptOutcome::Editing,
    }
}

/// State tracked by the event loop across iterations.
pub struct EventLoopState {
    /// Last operator message; cleared when a new clip starts.
    pub notice: Option<String>,
    /// Songs directory being typed, while the prompt is open.
    prompt: Option<String>,
    clock: Clock,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self {
            notice: None,
            prompt: None,
            clock: Clock::new(Instant::now()),
        }
    }

    /// Feed the clip timer with the time played since the last sample.
    fn catch_up(&mut self, controller: &mut Controller) {
        let playing = controller.game().status() == PlaybackStatus::Playing;
        let ms = self.clock.advance(Instant::now(), playing);
        if ms > 0 {
            if let Err(e) = controller.tick(ms) {
                log::warn!("timer tick ignored: {e}");
            }
        }
    }

    /// Run `cmd` between two clock samples. Time spent inside the command
    /// (a blocking backend call) is not counted as clip time.
    fn dispatch(&mut self, controller: &mut Controller, cmd: Command) {
        self.catch_up(controller);
        controller.handle(cmd);
        self.clock.restart(Instant::now());
    }

    fn open_prompt(&mut self, controller: &Controller) {
        self.prompt = Some(controller.songs_directory().display().to_string());
    }

    /// Text for the notice line: the prompt while it is open.
    fn notice_line(&self) -> Option<String> {
        match &self.prompt {
            Some(text) => Some(format!(
                "Songs directory: {text}_  (enter to load, esc to cancel)"
            )),
            None => self.notice.clone(),
        }
    }
}

/// Map a key press to an action. Unbound keys map to `None`.
pub fn key_action(key: KeyEvent) -> Option<Action> {
    let cmd = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return Some(Action::Quit);
        }
        KeyCode::Char('q') => return Some(Action::Quit),
        KeyCode::Enter | KeyCode::Char('l') => Command::NextTrack,
        KeyCode::Char(' ') | KeyCode::Char('p') => Command::TogglePause,
        KeyCode::Char('y') => Command::Correct,
        KeyCode::Char('n') => Command::Incorrect,
        KeyCode::Char('r') => Command::ReloadSongs,
        KeyCode::Char('d') => return Some(Action::EditSongsDirectory),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            Command::AdjustPlaybackTime(PLAYBACK_TIME_STEP)
        }
        KeyCode::Char('-') => Command::AdjustPlaybackTime(-PLAYBACK_TIME_STEP),
        KeyCode::Char(c @ '1'..='9') => Command::Buzz(c as usize - '1' as usize),
        _ => return None,
    };
    Some(Action::Run(cmd))
}

/// Map an MPRIS request to an action.
pub fn control_action(cmd: ControlCmd) -> Action {
    match cmd {
        ControlCmd::Quit => Action::Quit,
        ControlCmd::Play => Action::Run(Command::Resume),
        ControlCmd::Pause => Action::Run(Command::Pause),
        ControlCmd::PlayPause => Action::Run(Command::TogglePause),
        ControlCmd::Next => Action::Run(Command::NextTrack),
    }
}

/// Text for the notice line, if this event should replace it.
fn notice_for(event: &GameEvent, controller: &Controller) -> Option<String> {
    match event {
        GameEvent::Notice(msg) => Some(msg.clone()),
        GameEvent::Scored { team, score } => {
            let name = controller
                .game()
                .teams()
                .get(*team)
                .map(|t| t.name.as_str())
                .unwrap_or("?");
            Some(format!("{name} now has {score} points"))
        }
        GameEvent::QueueReloaded { tracks } => Some(match controller.backend() {
            BackendKind::RemoteStream => "The streaming service picks the songs".to_string(),
            BackendKind::LocalFile if *tracks == 0 => format!(
                "No songs found in {}",
                controller.songs_directory().display()
            ),
            BackendKind::LocalFile => format!("Loaded {tracks} songs"),
        }),
        GameEvent::PlaybackTimeChanged { seconds } => Some(format!("Playback time: {seconds}s")),
        _ => None,
    }
}

/// Main terminal loop: tick the clip timer, draw, route input. Returns when
/// the operator quits.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    controller: &mut Controller,
    events: &mpsc::Receiver<GameEvent>,
    control_rx: &mpsc::Receiver<ControlCmd>,
    mpris: &MprisHandle,
    state: &mut EventLoopState,
) -> anyhow::Result<()> {
    loop {
        state.catch_up(controller);

        while let Ok(event) = events.try_recv() {
            update_mpris(mpris, &event);
            if matches!(event, GameEvent::TrackStarted(_)) {
                state.notice = None;
            }
            if let Some(text) = notice_for(&event, controller) {
                state.notice = Some(text);
            }
        }

        let notice = state.notice_line();
        terminal.draw(|f| ui::draw(f, controller, notice.as_deref()))?;

        while let Ok(cmd) = control_rx.try_recv() {
            match control_action(cmd) {
                Action::Quit => return Ok(()),
                Action::Run(cmd) => state.dispatch(controller, cmd),
                Action::EditSongsDirectory => state.open_prompt(controller),
            }
        }

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if let Some(text) = state.prompt.as_mut() {
                    match prompt_key(text, key) {
                        PromptOutcome::Editing => {}
                        PromptOutcome::Cancel => state.prompt = None,
                        PromptOutcome::Submit(dir) => {
                            state.prompt = None;
                            state.dispatch(controller, Command::SetSongsDirectory(dir));
                        }
                    }
                    continue;
                }

                match key_action(key) {
                    Some(Action::Quit) => return Ok(()),
                    Some(Action::Run(cmd)) => state.dispatch(controller, cmd),
                    Some(Action::EditSongsDirectory) => state.open_prompt(controller),
                    None => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::error::Result;
    use crate::library::{SongQueue, Track};
    use crate::playback::{PlaybackDriver, TrackInfo};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn digits_buzz_zero_based_teams() {
        assert_eq!(
            key_action(press(KeyCode::Char('1'))),
            Some(Action::Run(Command::Buzz(0)))
        );
        assert_eq!(
            key_action(press(KeyCode::Char('6'))),
            Some(Action::Run(Command::Buzz(5)))
        );
        assert_eq!(key_action(press(KeyCode::Char('0'))), None);
    }

    #[test]
    fn operator_keys_map_to_commands() {
        let cases = [
            (KeyCode::Enter, Command::NextTrack),
            (KeyCode::Char('l'), Command::NextTrack),
            (KeyCode::Char(' '), Command::TogglePause),
            (KeyCode::Char('p'), Command::TogglePause),
            (KeyCode::Char('y'), Command::Correct),
            (KeyCode::Char('n'), Command::Incorrect),
            (KeyCode::Char('r'), Command::ReloadSongs),
            (KeyCode::Char('+'), Command::AdjustPlaybackTime(5)),
            (KeyCode::Char('-'), Command::AdjustPlaybackTime(-5)),
        ];
        for (code, cmd) in cases {
            assert_eq!(key_action(press(code)), Some(Action::Run(cmd)), "{code:?}");
        }
        assert_eq!(key_action(press(KeyCode::Char('x'))), None);
        assert_eq!(
            key_action(press(KeyCode::Char('d'))),
            Some(Action::EditSongsDirectory)
        );
    }

    #[test]
    fn quit_keys() {
        assert_eq!(key_action(press(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(
            key_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn mpris_requests_map_to_commands() {
        assert_eq!(control_action(ControlCmd::Quit), Action::Quit);
        assert_eq!(
            control_action(ControlCmd::PlayPause),
            Action::Run(Command::TogglePause)
        );
        assert_eq!(
            control_action(ControlCmd::Next),
            Action::Run(Command::NextTrack)
        );
    }

    #[test]
    fn clock_carries_sub_millisecond_remainders() {
        let start = Instant::now();
        let mut clock = Clock::new(start);

        let t1 = start + Duration::from_micros(1_600);
        assert_eq!(clock.advance(t1, true), 1);
        let t2 = t1 + Duration::from_micros(1_600);
        // 1.6 ms plus the 0.6 ms carried over.
        assert_eq!(clock.advance(t2, true), 2);
    }

    #[test]
    fn clock_discards_time_while_not_playing() {
        let start = Instant::now();
        let mut clock = Clock::new(start);

        assert_eq!(clock.advance(start + Duration::from_secs(10), false), 0);
        assert_eq!(
            clock.advance(start + Duration::from_millis(10_005), true),
            5
        );
    }

    #[test]
    fn clock_restart_drops_the_gap() {
        let start = Instant::now();
        let mut clock = Clock::new(start);

        // Stopped sample, then a start that took two seconds to return.
        assert_eq!(clock.advance(start, false), 0);
        let started = start + Duration::from_secs(2);
        clock.restart(started);
        assert_eq!(clock.advance(started + Duration::from_millis(7), true), 7);
    }

    #[test]
    fn prompt_edits_and_submits_a_trimmed_path() {
        let mut text = String::from("/music/ol");
        assert_eq!(prompt_key(&mut text, press(KeyCode::Backspace)), PromptOutcome::Editing);
        assert_eq!(prompt_key(&mut text, press(KeyCode::Char('d'))), PromptOutcome::Editing);
        assert_eq!(prompt_key(&mut text, press(KeyCode::Char(' '))), PromptOutcome::Editing);
        assert_eq!(text, "/music/od ");
        assert_eq!(
            prompt_key(&mut text, press(KeyCode::Enter)),
            PromptOutcome::Submit(PathBuf::from("/music/od"))
        );
    }

    #[test]
    fn prompt_cancels_on_escape_or_blank_input() {
        let mut text = String::from("songs");
        assert_eq!(prompt_key(&mut text, press(KeyCode::Esc)), PromptOutcome::Cancel);

        let mut blank = String::from("  ");
        assert_eq!(prompt_key(&mut blank, press(KeyCode::Enter)), PromptOutcome::Cancel);
    }

    /// Takes a while to start audio, like a remote skip.
    struct SlowStart;

    const START_DELAY: Duration = Duration::from_millis(60);

    impl PlaybackDriver for SlowStart {
        fn kind(&self) -> BackendKind {
            BackendKind::LocalFile
        }

        fn next_track(&mut self, _queue: &mut SongQueue) -> Result<Track> {
            Ok(Track::remote("spotify:track:slow", "Slow", None))
        }

        fn play(&mut self, _track: &Track) -> Result<()> {
            std::thread::sleep(START_DELAY);
            Ok(())
        }

        fn pause(&mut self) -> Result<()> {
            Ok(())
        }

        fn resume(&mut self) -> Result<()> {
            Ok(())
        }

        fn stop(&mut self) -> Result<()> {
            Ok(())
        }

        fn current_track_info(&self) -> Option<TrackInfo> {
            None
        }
    }

    #[test]
    fn slow_start_is_not_counted_as_clip_time() {
        let settings = Settings::embedded_defaults().unwrap();
        let mut controller = Controller::new(&settings, Box::new(SlowStart));
        let mut state = EventLoopState::new();

        state.dispatch(&mut controller, Command::NextTrack);
        assert_eq!(controller.game().status(), PlaybackStatus::Playing);

        state.catch_up(&mut controller);
        assert!(
            controller.game().elapsed_ms() < START_DELAY.as_millis() as u64,
            "counted {} ms",
            controller.game().elapsed_ms()
        );
    }

    #[test]
    fn prompt_replaces_the_notice_line() {
        let mut state = EventLoopState::new();
        state.notice = Some("Loaded 3 songs".to_string());
        assert_eq!(state.notice_line().as_deref(), Some("Loaded 3 songs"));

        state.prompt = Some("/music".to_string());
        assert!(state.notice_line().unwrap().starts_with("Songs directory: /music_"));
    }
}
